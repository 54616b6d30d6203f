//! # build-artifact-dl
//!
//! Resolves the artifacts published by a CI build and downloads them into a
//! local directory, running one transfer job per artifact concurrently.
//!
//! ## Design Philosophy
//!
//! build-artifact-dl is designed to be:
//! - **Fail-fast before transfer** - Bad linkage, missing artifacts and malformed
//!   container data abort before any byte moves
//! - **All-or-nothing result** - Every launched job runs to completion and the
//!   download succeeds only if all of them did
//! - **Library-first** - Collaborators sit behind traits and can be swapped
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use build_artifact_dl::{ArtifactDownloader, BuildId, BuildReference, Config, DownloadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::from_env();
//!     config.service.base_url = "https://dev.example.com/org".to_string();
//!
//!     let downloader = ArtifactDownloader::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let build = BuildReference::new(BuildId(1234)).with_project("web");
//!     let summary = downloader
//!         .download(&build, &DownloadRequest::all(None, "./artifacts"))
//!         .await?;
//!     println!("{} files written", summary.total_items());
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Authentication for service requests
pub mod auth;
/// Build metadata access
pub mod build_api;
/// Configuration types
pub mod config;
/// Download orchestration (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// Item pattern matching
pub mod pattern;
/// Pipeline task boundary
pub mod task;
/// Item-level artifact transfer
pub mod transfer;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use build_api::{BuildMetadataClient, HttpBuildClient};
pub use config::{Config, EmptyArtifactsPolicy, ServiceConfig, TransferConfig};
pub use downloader::{ArtifactDownloader, ResolvedArtifacts, TransferJob};
pub use error::{Error, ErrorKind, JobFailure, Result, TransferError};
pub use pattern::ItemPattern;
pub use task::{TaskInputs, TaskResult, run_task};
pub use transfer::{
    ArtifactEngine, DestinationProvider, SourceProvider, TransferEngine, TransferOptions,
};
pub use types::{
    ArtifactDescriptor, ArtifactResource, BuildArtifact, BuildId, BuildReference, BuildSummary,
    ContainerLocator, DefinitionId, DownloadMode, DownloadRequest, DownloadSummary, Event,
    TransferOutcome, TransferStats,
};
