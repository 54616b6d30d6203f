//! Default transfer engine: enumerate, filter, then copy with bounded concurrency.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;

use super::{
    DestinationProvider, ItemKind, RemoteItem, SourceProvider, TransferEngine, TransferOptions,
};
use crate::error::TransferError;
use crate::types::TransferStats;

/// Item-level transfer engine
///
/// Walks the source breadth-first, keeps the files the item pattern selects and
/// copies up to `parallel_limit` of them at a time. Every selected item is
/// attempted; the job fails with the first item error once all have finished.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactEngine;

impl ArtifactEngine {
    /// Create an engine
    pub fn new() -> Self {
        Self
    }
}

/// Walk the source and return the files selected by the pattern
pub(crate) async fn enumerate_items(
    source: &dyn SourceProvider,
    options: &TransferOptions,
) -> Result<Vec<RemoteItem>, TransferError> {
    let mut pending: VecDeque<RemoteItem> = source.root_items().await?.into();
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    while let Some(item) = pending.pop_front() {
        // Shallow container listings repeat the folder and its already-listed siblings
        if !seen.insert(item.path.clone()) {
            continue;
        }
        match item.kind {
            ItemKind::Folder => {
                let children = source.list(&item).await?;
                pending.extend(children.into_iter().filter(|c| !seen.contains(&c.path)));
            }
            ItemKind::File => {
                if options.item_pattern.matches(&item.path) {
                    selected.push(item);
                } else if options.verbose {
                    tracing::debug!(item = %item.path, "item not selected by pattern");
                }
            }
        }
    }

    Ok(selected)
}

async fn transfer_item(
    source: Arc<dyn SourceProvider>,
    destination: Arc<dyn DestinationProvider>,
    item: RemoteItem,
    verbose: bool,
) -> Result<u64, TransferError> {
    let content = source.open(&item).await?;
    let bytes = destination.write(&item.path, content).await?;
    if verbose {
        tracing::debug!(item = %item.path, bytes, "item transferred");
    }
    Ok(bytes)
}

#[async_trait]
impl TransferEngine for ArtifactEngine {
    async fn process_items(
        &self,
        source: Arc<dyn SourceProvider>,
        destination: Arc<dyn DestinationProvider>,
        options: TransferOptions,
    ) -> Result<TransferStats, TransferError> {
        let started = Instant::now();
        let items = enumerate_items(source.as_ref(), &options).await?;
        let total = items.len();
        let limit = options.parallel_limit.max(1);

        tracing::info!(
            source = %source.describe(),
            destination = %destination.describe(),
            items = total,
            parallel_limit = limit,
            "transferring items"
        );

        let results: Vec<Result<u64, TransferError>> = stream::iter(items)
            .map(|item| {
                transfer_item(
                    Arc::clone(&source),
                    Arc::clone(&destination),
                    item,
                    options.verbose,
                )
            })
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut stats = TransferStats::default();
        let mut first_error = None;
        for result in results {
            match result {
                Ok(bytes) => {
                    stats.items += 1;
                    stats.bytes += bytes;
                }
                Err(e) => {
                    tracing::warn!(source = %source.describe(), error = %e, "item transfer failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        stats.elapsed = started.elapsed();

        match first_error {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}
