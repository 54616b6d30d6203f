//! Job planning and fan-out.
//!
//! Planning runs to completion before anything is launched, so a malformed
//! container locator on any artifact aborts the download with no job started.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::auth::AuthProvider;
use crate::error::{Result, TransferError};
use crate::transfer::{
    ContainerSource, DestinationProvider, FilesystemDestination, FilesystemSource, SourceProvider,
    TransferEngine, TransferOptions,
};
use crate::types::{
    ArtifactDescriptor, ArtifactResource, ContainerLocator, Event, SkippedArtifact, TransferStats,
    strip_file_scheme,
};

/// One artifact's transfer, ready to launch
#[derive(Clone)]
pub struct TransferJob {
    /// Artifact name
    pub artifact: String,
    /// Where the items are read from
    pub source: Arc<dyn SourceProvider>,
    /// Where the items are written to
    pub destination: Arc<dyn DestinationProvider>,
    /// Pattern, parallelism and verbosity
    pub options: TransferOptions,
}

impl std::fmt::Debug for TransferJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferJob")
            .field("artifact", &self.artifact)
            .field("source", &self.source.describe())
            .field("destination", &self.destination.describe())
            .field("options", &self.options)
            .finish()
    }
}

/// Shared inputs for building providers
pub(crate) struct Endpoints<'a> {
    pub http: &'a reqwest::Client,
    pub base_url: &'a str,
    pub auth: &'a Arc<dyn AuthProvider>,
    pub destination: &'a Path,
}

/// Jobs to launch plus the artifacts left out
pub(crate) struct DispatchPlan {
    pub jobs: Vec<TransferJob>,
    pub skipped: Vec<SkippedArtifact>,
}

/// Build one job per supported artifact, in artifact order.
///
/// Unsupported storage types are logged, reported as [`Event::ArtifactSkipped`]
/// and left out of the plan. An unparseable container locator fails the
/// whole plan.
pub(crate) fn plan_jobs(
    artifacts: &[ArtifactDescriptor],
    endpoints: &Endpoints<'_>,
    options: &TransferOptions,
    event_tx: &broadcast::Sender<Event>,
) -> Result<DispatchPlan> {
    let destination: Arc<dyn DestinationProvider> =
        Arc::new(FilesystemDestination::new(endpoints.destination));
    let mut jobs = Vec::with_capacity(artifacts.len());
    let mut skipped = Vec::new();

    for artifact in artifacts {
        let source: Arc<dyn SourceProvider> = match &artifact.resource {
            ArtifactResource::Container { locator } => {
                let locator = ContainerLocator::parse(&artifact.name, locator)?;
                Arc::new(ContainerSource::new(
                    endpoints.http.clone(),
                    endpoints.base_url,
                    &locator,
                    Arc::clone(endpoints.auth),
                )?)
            }
            ArtifactResource::FilePath { download_url } => {
                Arc::new(FilesystemSource::new(strip_file_scheme(download_url)))
            }
            ArtifactResource::Unsupported { resource_type } => {
                tracing::warn!(
                    artifact = %artifact.name,
                    resource_type = %resource_type,
                    "unsupported artifact type, skipping"
                );
                event_tx
                    .send(Event::ArtifactSkipped {
                        artifact: artifact.name.clone(),
                        resource_type: resource_type.clone(),
                    })
                    .ok();
                skipped.push(SkippedArtifact {
                    artifact: artifact.name.clone(),
                    resource_type: resource_type.clone(),
                });
                continue;
            }
        };

        jobs.push(TransferJob {
            artifact: artifact.name.clone(),
            source,
            destination: Arc::clone(&destination),
            options: options.clone(),
        });
    }

    Ok(DispatchPlan { jobs, skipped })
}

/// A launched job and the handle to await its result
pub(crate) struct LaunchedJob {
    pub artifact: String,
    pub handle: JoinHandle<std::result::Result<TransferStats, TransferError>>,
}

/// Spawn every job immediately, in plan order.
///
/// Jobs are not throttled against each other; each engine call bounds its
/// own item concurrency.
pub(crate) fn launch_jobs(
    jobs: Vec<TransferJob>,
    engine: &Arc<dyn TransferEngine>,
    event_tx: &broadcast::Sender<Event>,
) -> Vec<LaunchedJob> {
    jobs.into_iter()
        .map(|job| {
            let TransferJob {
                artifact,
                source,
                destination,
                options,
            } = job;
            let source_desc = source.describe();

            tracing::info!(
                artifact = %artifact,
                source = %source_desc,
                "starting artifact transfer"
            );
            event_tx
                .send(Event::TransferStarted {
                    artifact: artifact.clone(),
                    source: source_desc,
                })
                .ok();

            let engine = Arc::clone(engine);
            let tx = event_tx.clone();
            let name = artifact.clone();
            let handle = tokio::spawn(async move {
                let result = engine.process_items(source, destination, options).await;
                match &result {
                    Ok(stats) => {
                        tracing::info!(
                            artifact = %name,
                            items = stats.items,
                            bytes = stats.bytes,
                            elapsed = ?stats.elapsed,
                            "artifact transfer completed"
                        );
                        tx.send(Event::TransferCompleted {
                            artifact: name,
                            items: stats.items,
                            bytes: stats.bytes,
                        })
                        .ok();
                    }
                    Err(e) => {
                        tracing::error!(artifact = %name, error = %e, "artifact transfer failed");
                        tx.send(Event::TransferFailed {
                            artifact: name,
                            error: e.to_string(),
                        })
                        .ok();
                    }
                }
                result
            });

            LaunchedJob { artifact, handle }
        })
        .collect()
}
