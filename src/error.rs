//! Error types for build-artifact-dl
//!
//! This module provides error handling for the library, including:
//! - The top-level [`Error`] returned by a download invocation
//! - [`TransferError`] for failures inside a single artifact transfer job
//! - Classification of errors into [`ErrorKind`] and stable error codes

use std::path::PathBuf;
use thiserror::Error;

use crate::types::{BuildId, DefinitionId};

/// Result type alias for build-artifact-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for build-artifact-dl
///
/// Validation, resolution and format errors are fatal and are raised before any
/// transfer job starts. Per-job transfer errors are collected and surfaced
/// together through [`Error::TransfersFailed`].
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or input error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key or input name that caused the error (e.g., "buildId")
        key: Option<String>,
    },

    /// The build service returned no builds for the requested definition
    #[error("no builds found for definition {definition_id}")]
    NoBuildsFound {
        /// The definition that was queried
        definition_id: DefinitionId,
    },

    /// The requested build does not belong to the requested definition
    #[error("build {build_id} does not belong to definition {definition_id}")]
    BuildDefinitionMismatch {
        /// The requested build
        build_id: BuildId,
        /// The definition the build was expected to belong to
        definition_id: DefinitionId,
    },

    /// A named artifact does not exist on the build
    #[error("artifact '{name}' not found for build {build_id}")]
    ArtifactNotFound {
        /// The requested artifact name
        name: String,
        /// The build that was queried
        build_id: BuildId,
    },

    /// The build has no linked artifacts (only raised under `EmptyArtifactsPolicy::Fail`)
    #[error("no artifacts found for build {build_id}")]
    NoArtifactsFound {
        /// The build that was queried
        build_id: BuildId,
    },

    /// A container artifact carries a locator that cannot be decomposed
    #[error("invalid container data for artifact '{artifact}': '{locator}'")]
    InvalidContainerData {
        /// The artifact whose locator is malformed
        artifact: String,
        /// The raw locator as returned by the build service
        locator: String,
    },

    /// The item pattern could not be compiled
    #[error("invalid item pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern line
        pattern: String,
        /// Why the pattern was rejected
        reason: String,
    },

    /// One or more artifact transfer jobs failed
    #[error("{} artifact transfer(s) failed: {}", .failures.len(), describe_failures(.failures))]
    TransfersFailed {
        /// Every failed job, in dispatch order
        failures: Vec<JobFailure>,
    },

    /// The build service answered with a non-success status
    #[error("build service returned {status} for {url}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The requested URL
        url: String,
        /// Response body or reason phrase
        message: String,
    },

    /// Network error talking to the build service
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A service URL could not be parsed or joined
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// A failed transfer job and the artifact it belonged to
#[derive(Debug)]
pub struct JobFailure {
    /// Name of the artifact whose job failed
    pub artifact: String,
    /// The underlying transfer error
    pub error: TransferError,
}

fn describe_failures(failures: &[JobFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.artifact, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised inside a single transfer job
#[derive(Debug, Error)]
pub enum TransferError {
    /// Listing the items of a source failed
    #[error("failed to list items at {location}: {reason}")]
    Listing {
        /// The listing URL or directory
        location: String,
        /// Why the listing failed
        reason: String,
    },

    /// An item download answered with a non-success status
    #[error("item download from {url} returned {status}")]
    Http {
        /// The item URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Network error while transferring an item
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Filesystem error at a specific path
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file or directory being read or written
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// The source root does not exist
    #[error("source path {0} does not exist")]
    SourceMissing(PathBuf),

    /// An item path would escape the destination root
    #[error("item path '{0}' escapes the destination root")]
    UnsafePath(String),

    /// The job's task panicked or was aborted before reporting an outcome
    #[error("transfer task aborted: {0}")]
    Aborted(String),
}

impl TransferError {
    /// Wrap an I/O error with the path it occurred at
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad configuration or task inputs
    Configuration,
    /// Build/definition linkage check failed
    Validation,
    /// Artifact lookup failed
    Resolution,
    /// An artifact descriptor is unusable
    Format,
    /// One or more transfer jobs failed
    Transfer,
    /// A collaborator (HTTP, filesystem, JSON) failed
    Collaborator,
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a named key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. } | Error::InvalidPattern { .. } => ErrorKind::Configuration,
            Error::NoBuildsFound { .. } | Error::BuildDefinitionMismatch { .. } => {
                ErrorKind::Validation
            }
            Error::ArtifactNotFound { .. } | Error::NoArtifactsFound { .. } => {
                ErrorKind::Resolution
            }
            Error::InvalidContainerData { .. } => ErrorKind::Format,
            Error::TransfersFailed { .. } => ErrorKind::Transfer,
            Error::Api { .. }
            | Error::Network(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::InvalidUrl(_) => ErrorKind::Collaborator,
        }
    }

    /// Whether this error stops the invocation before any job is dispatched
    pub fn is_pre_dispatch(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Transfer)
    }

    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::NoBuildsFound { .. } => "no_builds_found",
            Error::BuildDefinitionMismatch { .. } => "build_definition_mismatch",
            Error::ArtifactNotFound { .. } => "artifact_not_found",
            Error::NoArtifactsFound { .. } => "no_artifacts_found",
            Error::InvalidContainerData { .. } => "invalid_container_data",
            Error::InvalidPattern { .. } => "invalid_pattern",
            Error::TransfersFailed { .. } => "transfers_failed",
            Error::Api { .. } => "api_error",
            Error::Network(_) => "network_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::InvalidUrl(_) => "invalid_url",
        }
    }
}
