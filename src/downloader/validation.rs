//! Build/definition linkage check.

use crate::build_api::BuildMetadataClient;
use crate::error::{Error, Result};
use crate::types::{BuildId, DefinitionId};

/// Confirm `build_id` belongs to `definition_id`.
///
/// Succeeds without calling the service when no definition is given.
pub(crate) async fn validate_build_linkage(
    client: &dyn BuildMetadataClient,
    project: Option<&str>,
    build_id: BuildId,
    definition_id: Option<DefinitionId>,
) -> Result<()> {
    let Some(definition_id) = definition_id else {
        return Ok(());
    };

    let builds = client.get_builds(project, &[definition_id]).await?;
    if builds.is_empty() {
        tracing::error!(definition_id = definition_id.0, "no builds found for definition");
        return Err(Error::NoBuildsFound { definition_id });
    }

    if !builds.iter().any(|b| b.id == build_id) {
        tracing::error!(
            build_id = build_id.0,
            definition_id = definition_id.0,
            "build does not belong to definition"
        );
        return Err(Error::BuildDefinitionMismatch {
            build_id,
            definition_id,
        });
    }

    tracing::debug!(
        build_id = build_id.0,
        definition_id = definition_id.0,
        "build belongs to definition"
    );
    Ok(())
}
