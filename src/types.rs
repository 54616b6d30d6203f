//! Core types for build-artifact-dl

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, TransferError};

/// Identifier of a single build run
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub i64);

impl std::fmt::Display for BuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BuildId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Identifier of a build definition (pipeline)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(pub i64);

impl std::fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for DefinitionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// The build an invocation downloads from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildReference {
    /// Project the build lives in (None = collection-scoped API calls)
    pub project: Option<String>,
    /// Definition the build must belong to, when given
    pub definition_id: Option<DefinitionId>,
    /// The build to download artifacts from
    pub build_id: BuildId,
}

impl BuildReference {
    /// Reference a build without a definition linkage check
    pub fn new(build_id: BuildId) -> Self {
        Self {
            project: None,
            definition_id: None,
            build_id,
        }
    }

    /// Scope API calls to a project
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Require the build to belong to a definition
    pub fn with_definition(mut self, definition_id: DefinitionId) -> Self {
        self.definition_id = Some(definition_id);
        self
    }
}

/// Which artifacts of a build to download
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadMode {
    /// Exactly one named artifact
    Single {
        /// Name of the artifact
        artifact_name: String,
    },
    /// Every artifact linked to the build
    All {
        /// Optional item pattern (newline separated, `!` excludes); None or blank = `**`
        item_pattern: Option<String>,
    },
}

/// What to download and where
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Download mode
    pub mode: DownloadMode,
    /// Root directory all artifacts are written under
    pub destination: PathBuf,
}

impl DownloadRequest {
    /// Download a single named artifact
    pub fn single(artifact_name: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            mode: DownloadMode::Single {
                artifact_name: artifact_name.into(),
            },
            destination: destination.into(),
        }
    }

    /// Download every artifact, optionally filtered by an item pattern
    pub fn all(item_pattern: Option<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            mode: DownloadMode::All { item_pattern },
            destination: destination.into(),
        }
    }
}

/// A build as listed by the build service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    /// Build id
    pub id: BuildId,
    /// Human-readable build number, if the service sent one
    #[serde(default, rename = "buildNumber", skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
}

/// Storage resource of an artifact as it appears on the wire
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactResourceData {
    /// Type tag, e.g. "Container" or "FilePath"
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Type-specific locator (container locator for containers, share path for file paths)
    #[serde(default)]
    pub data: String,
    /// Download URL (used for file path artifacts)
    #[serde(default)]
    pub download_url: Option<String>,
}

/// An artifact as returned by the build service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArtifact {
    /// Artifact name
    pub name: String,
    /// Where the artifact's content is stored
    pub resource: ArtifactResourceData,
}

/// Storage backend of an artifact, classified once from the wire type tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactResource {
    /// Hosted file container; locator is `<marker>/<containerId>/<path>`
    Container {
        /// Raw container locator
        locator: String,
    },
    /// File share or local path, addressed by a `file:` URL
    FilePath {
        /// Raw download URL
        download_url: String,
    },
    /// Any other storage type
    Unsupported {
        /// The type tag as reported by the service
        resource_type: String,
    },
}

/// A resolved artifact ready to be dispatched
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// Artifact name
    pub name: String,
    /// Classified storage backend
    pub resource: ArtifactResource,
}

impl From<BuildArtifact> for ArtifactDescriptor {
    fn from(artifact: BuildArtifact) -> Self {
        let ArtifactResourceData {
            resource_type,
            data,
            download_url,
        } = artifact.resource;

        let resource = if resource_type.eq_ignore_ascii_case("container") {
            ArtifactResource::Container { locator: data }
        } else if resource_type.eq_ignore_ascii_case("filepath") {
            ArtifactResource::FilePath {
                download_url: download_url.unwrap_or(data),
            }
        } else {
            ArtifactResource::Unsupported { resource_type }
        };

        Self {
            name: artifact.name,
            resource,
        }
    }
}

/// A decomposed container locator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerLocator {
    /// Numeric container id
    pub container_id: u64,
    /// Path prefix inside the container
    pub item_path: String,
}

impl ContainerLocator {
    /// Decompose `<marker>/<containerId>/<path>` (split on `/`, at most 3 parts)
    ///
    /// Anything other than exactly three parts, or a non-numeric container id,
    /// is [`Error::InvalidContainerData`].
    pub fn parse(artifact: &str, locator: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidContainerData {
            artifact: artifact.to_string(),
            locator: locator.to_string(),
        };

        let parts: Vec<&str> = locator.splitn(3, '/').collect();
        let [_marker, id, item_path] = parts.as_slice() else {
            return Err(invalid());
        };

        let container_id = id.trim().parse::<u64>().map_err(|_| invalid())?;

        Ok(Self {
            container_id,
            item_path: (*item_path).to_string(),
        })
    }
}

/// Strip the `file:` scheme from a file path artifact's download URL
pub fn strip_file_scheme(download_url: &str) -> PathBuf {
    let path = download_url
        .strip_prefix("file:")
        .or_else(|| download_url.strip_prefix("FILE:"))
        .unwrap_or(download_url);
    PathBuf::from(path)
}

/// Counters reported by a finished transfer job
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Number of files written
    pub items: u64,
    /// Number of bytes written
    pub bytes: u64,
    /// Wall-clock time the job took
    pub elapsed: Duration,
}

/// Result of one artifact's transfer job
#[derive(Debug)]
pub struct TransferOutcome {
    /// Artifact the job transferred
    pub artifact: String,
    /// What happened
    pub result: Result<TransferStats, TransferError>,
}

impl TransferOutcome {
    /// Whether the job succeeded
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// An artifact that was not transferred because its storage type is unsupported
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedArtifact {
    /// Artifact name
    pub artifact: String,
    /// The unsupported type tag
    pub resource_type: String,
}

/// Summary of a successful download invocation
#[derive(Debug)]
pub struct DownloadSummary {
    /// Build the artifacts came from
    pub build_id: BuildId,
    /// Effective item pattern
    pub pattern: String,
    /// One outcome per dispatched job, in dispatch order (all successful)
    pub outcomes: Vec<TransferOutcome>,
    /// Artifacts skipped for unsupported storage types
    pub skipped: Vec<SkippedArtifact>,
    /// When the invocation started
    pub started_at: DateTime<Utc>,
    /// When the last job finished
    pub finished_at: DateTime<Utc>,
}

impl DownloadSummary {
    /// Total files written across all jobs
    pub fn total_items(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.items)
            .sum()
    }

    /// Total bytes written across all jobs
    pub fn total_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.bytes)
            .sum()
    }
}

/// Events emitted while a download runs
///
/// Consumers subscribe via [`ArtifactDownloader::subscribe`](crate::ArtifactDownloader::subscribe).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The build/definition linkage check passed (or was not required)
    ValidationPassed {
        /// Build being downloaded
        build_id: BuildId,
    },
    /// Artifacts were resolved
    ArtifactsResolved {
        /// Number of artifacts found
        count: usize,
        /// Effective item pattern
        pattern: String,
    },
    /// A transfer job was launched
    TransferStarted {
        /// Artifact name
        artifact: String,
        /// Listing URL or share path the job reads from
        source: String,
    },
    /// An artifact was skipped because its storage type is unsupported
    ArtifactSkipped {
        /// Artifact name
        artifact: String,
        /// The unsupported type tag
        resource_type: String,
    },
    /// A transfer job finished successfully
    TransferCompleted {
        /// Artifact name
        artifact: String,
        /// Files written
        items: u64,
        /// Bytes written
        bytes: u64,
    },
    /// A transfer job failed
    TransferFailed {
        /// Artifact name
        artifact: String,
        /// Error message
        error: String,
    },
    /// Every launched job has finished
    DownloadFinished {
        /// Jobs that succeeded
        succeeded: usize,
        /// Jobs that failed
        failed: usize,
        /// Artifacts skipped
        skipped: usize,
    },
}
