//! Pipeline task boundary
//!
//! Converts raw task inputs into a [`BuildReference`] and [`DownloadRequest`],
//! and an invocation result into the succeeded/failed sentinel a pipeline
//! agent expects.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::Config;
use crate::downloader::ArtifactDownloader;
use crate::error::{Error, Result};
use crate::types::{BuildId, BuildReference, DefinitionId, DownloadRequest, DownloadSummary};

/// Raw inputs as supplied to the pipeline task
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInputs {
    /// Project name or id
    #[serde(default)]
    pub project: Option<String>,
    /// Build definition id the build must belong to
    #[serde(default)]
    pub definition: Option<String>,
    /// Build id (required)
    pub build_id: String,
    /// Destination root directory (required)
    pub download_path: PathBuf,
    /// `single`, or `specific`/`all` for every artifact
    pub download_type: String,
    /// Artifact name, required when `download_type` is `single`
    #[serde(default)]
    pub artifact_name: Option<String>,
    /// Item pattern for `all` downloads
    #[serde(default)]
    pub item_pattern: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl TaskInputs {
    /// Validate the inputs and convert them into a download request
    pub fn into_request(self) -> Result<(BuildReference, DownloadRequest)> {
        let build_id: BuildId = self.build_id.parse().map_err(|_| {
            Error::config("buildId", format!("'{}' is not a build id", self.build_id))
        })?;

        if self.download_path.as_os_str().is_empty() {
            return Err(Error::config("downloadPath", "download path is required"));
        }

        let mut build = BuildReference::new(build_id);
        if let Some(project) = non_blank(&self.project) {
            build = build.with_project(project);
        }
        if let Some(definition) = non_blank(&self.definition) {
            let definition_id: DefinitionId = definition.parse().map_err(|_| {
                Error::config(
                    "definition",
                    format!("'{definition}' is not a definition id"),
                )
            })?;
            build = build.with_definition(definition_id);
        }

        let download_type = self.download_type.trim().to_ascii_lowercase();
        let request = match download_type.as_str() {
            "single" => {
                let name = non_blank(&self.artifact_name).ok_or_else(|| {
                    Error::config("artifactName", "artifact name is required for a single download")
                })?;
                DownloadRequest::single(name, self.download_path)
            }
            "specific" | "all" => DownloadRequest::all(self.item_pattern, self.download_path),
            other => {
                return Err(Error::config(
                    "downloadType",
                    format!("unknown download type '{other}'"),
                ));
            }
        };

        Ok((build, request))
    }
}

/// Final status reported to the pipeline agent
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskResult {
    /// Every job succeeded
    Succeeded,
    /// The invocation failed with this message
    Failed(String),
}

impl TaskResult {
    /// Derive the task status from an invocation result
    pub fn from_result(result: &Result<DownloadSummary>) -> Self {
        match result {
            Ok(_) => TaskResult::Succeeded,
            Err(e) => TaskResult::Failed(e.to_string()),
        }
    }

    /// Process exit code: 0 on success, 1 on failure
    pub fn exit_code(&self) -> i32 {
        match self {
            TaskResult::Succeeded => 0,
            TaskResult::Failed(_) => 1,
        }
    }
}

/// Run a download from task inputs with the default collaborators
pub async fn run_task(config: Config, inputs: TaskInputs) -> TaskResult {
    let result = async {
        let (build, request) = inputs.into_request()?;
        let downloader = ArtifactDownloader::new(config)?;
        downloader.download(&build, &request).await
    }
    .await;

    if let Err(e) = &result {
        tracing::error!(error = %e, code = e.error_code(), "task failed");
    }
    TaskResult::from_result(&result)
}
