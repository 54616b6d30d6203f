//! Artifact resolution: which artifacts to fetch and which items to keep.

use crate::build_api::BuildMetadataClient;
use crate::config::EmptyArtifactsPolicy;
use crate::error::{Error, Result};
use crate::pattern::{all_artifacts_pattern, single_artifact_pattern};
use crate::types::{ArtifactDescriptor, BuildId, DownloadMode};

/// Artifacts to dispatch and the pattern every job filters items with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifacts {
    /// Artifacts in service order
    pub artifacts: Vec<ArtifactDescriptor>,
    /// Effective item pattern
    pub pattern: String,
}

/// Resolve the artifact list and pattern for a download mode.
///
/// - `Single`: exactly the named artifact, pattern `<name>/**`
/// - `All`: every linked artifact, the caller's pattern or `**`
pub(crate) async fn resolve_artifacts(
    client: &dyn BuildMetadataClient,
    project: Option<&str>,
    build_id: BuildId,
    mode: &DownloadMode,
    empty_policy: EmptyArtifactsPolicy,
) -> Result<ResolvedArtifacts> {
    match mode {
        DownloadMode::Single { artifact_name } => {
            let artifact = client
                .get_artifact(build_id, artifact_name, project)
                .await?
                .ok_or_else(|| Error::ArtifactNotFound {
                    name: artifact_name.clone(),
                    build_id,
                })?;

            Ok(ResolvedArtifacts {
                artifacts: vec![ArtifactDescriptor::from(artifact)],
                pattern: single_artifact_pattern(artifact_name),
            })
        }
        DownloadMode::All { item_pattern } => {
            let artifacts = client.get_artifacts(build_id, project).await?;
            tracing::info!(build_id = build_id.0, count = artifacts.len(), "linked artifacts");

            if artifacts.is_empty() && empty_policy == EmptyArtifactsPolicy::Fail {
                return Err(Error::NoArtifactsFound { build_id });
            }

            Ok(ResolvedArtifacts {
                artifacts: artifacts.into_iter().map(ArtifactDescriptor::from).collect(),
                pattern: all_artifacts_pattern(item_pattern.as_deref()),
            })
        }
    }
}
