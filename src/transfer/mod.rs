//! Item-level transfer of a single artifact
//!
//! A transfer job moves every selected item from a [`SourceProvider`] into a
//! [`DestinationProvider`]. The [`TransferEngine`] trait is the seam the
//! orchestrator dispatches through; [`ArtifactEngine`] is the default
//! implementation.
//!
//! ## Providers
//!
//! - [`ContainerSource`]: hosted file container, listed over HTTP with paging
//! - [`FilesystemSource`]: file share or local directory
//! - [`FilesystemDestination`]: local directory tree

mod container;
mod engine;
mod filesystem;

pub use container::{ContainerSource, container_listing_url};
pub use engine::ArtifactEngine;
pub use filesystem::{FilesystemDestination, FilesystemSource};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::sync::Arc;

use crate::error::TransferError;
use crate::pattern::ItemPattern;
use crate::types::TransferStats;

/// Content of one item, delivered in chunks
pub type ByteStream = BoxStream<'static, Result<Bytes, TransferError>>;

/// Whether an item holds content or other items
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    /// Regular file
    File,
    /// Directory / folder
    Folder,
}

impl ItemKind {
    /// Whether this is a folder
    pub fn is_folder(self) -> bool {
        matches!(self, ItemKind::Folder)
    }
}

/// An item enumerated from a source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteItem {
    /// Path relative to the destination root, `/` separated, starting with the artifact name
    pub path: String,
    /// File or folder
    pub kind: ItemKind,
    /// Provider-specific location (content URL, absolute file path)
    pub location: Option<String>,
    /// Size in bytes, when known
    pub size: Option<u64>,
}

impl RemoteItem {
    /// A file item
    pub fn file(path: impl Into<String>, location: Option<String>, size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::File,
            location,
            size,
        }
    }

    /// A folder item
    pub fn folder(path: impl Into<String>, location: Option<String>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::Folder,
            location,
            size: None,
        }
    }
}

/// Enumerates and reads the items of an artifact
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Items at the root of the source
    async fn root_items(&self) -> Result<Vec<RemoteItem>, TransferError>;

    /// Immediate children of a folder item
    async fn list(&self, folder: &RemoteItem) -> Result<Vec<RemoteItem>, TransferError>;

    /// Open a file item for reading
    async fn open(&self, item: &RemoteItem) -> Result<ByteStream, TransferError>;

    /// Where this source reads from, for logs and events
    fn describe(&self) -> String;
}

/// Persists items under a root
#[async_trait]
pub trait DestinationProvider: Send + Sync {
    /// Write an item's content to `relative_path`, creating parent directories.
    /// Returns the number of bytes written.
    async fn write(&self, relative_path: &str, content: ByteStream) -> Result<u64, TransferError>;

    /// Where this destination writes to, for logs and events
    fn describe(&self) -> String;
}

/// Options for one transfer job
#[derive(Clone, Debug)]
pub struct TransferOptions {
    /// Which items to transfer
    pub item_pattern: ItemPattern,
    /// Maximum items in flight at once
    pub parallel_limit: usize,
    /// Log each item
    pub verbose: bool,
}

/// Runs a single artifact transfer job
#[async_trait]
pub trait TransferEngine: Send + Sync {
    /// Transfer every item of `source` selected by the options into `destination`
    async fn process_items(
        &self,
        source: Arc<dyn SourceProvider>,
        destination: Arc<dyn DestinationProvider>,
        options: TransferOptions,
    ) -> Result<TransferStats, TransferError>;
}
