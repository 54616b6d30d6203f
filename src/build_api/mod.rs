//! Build metadata access
//!
//! The orchestrator only talks to the build service through the
//! [`BuildMetadataClient`] trait. [`HttpBuildClient`] is the REST
//! implementation; tests substitute in-memory fakes.

mod http;

pub use http::HttpBuildClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{BuildArtifact, BuildId, BuildSummary, DefinitionId};

/// Read access to builds and their artifacts
///
/// Errors (transport, authorization, unexpected status) are returned as-is and
/// abort the invocation.
#[async_trait]
pub trait BuildMetadataClient: Send + Sync {
    /// List builds of the given definitions
    async fn get_builds(
        &self,
        project: Option<&str>,
        definitions: &[DefinitionId],
    ) -> Result<Vec<BuildSummary>>;

    /// Fetch one artifact of a build by name (None = no such artifact)
    async fn get_artifact(
        &self,
        build_id: BuildId,
        name: &str,
        project: Option<&str>,
    ) -> Result<Option<BuildArtifact>>;

    /// Fetch every artifact linked to a build
    async fn get_artifacts(
        &self,
        build_id: BuildId,
        project: Option<&str>,
    ) -> Result<Vec<BuildArtifact>>;
}
