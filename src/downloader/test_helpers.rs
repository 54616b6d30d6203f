//! Shared test doubles for creating ArtifactDownloader instances in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::build_api::BuildMetadataClient;
use crate::config::Config;
use crate::downloader::ArtifactDownloader;
use crate::error::{Result, TransferError};
use crate::transfer::{DestinationProvider, SourceProvider, TransferEngine, TransferOptions};
use crate::types::{
    ArtifactResourceData, BuildArtifact, BuildId, BuildSummary, DefinitionId, TransferStats,
};

pub(crate) const BASE_URL: &str = "https://dev.example.com/org";

/// A container artifact with locator `#/<id>/<path>`
pub(crate) fn container_artifact(name: &str, container_id: u64, path: &str) -> BuildArtifact {
    raw_artifact(name, "Container", &format!("#/{container_id}/{path}"), None)
}

/// A file share artifact
pub(crate) fn file_share_artifact(name: &str, download_url: &str) -> BuildArtifact {
    raw_artifact(name, "FilePath", "", Some(download_url))
}

pub(crate) fn raw_artifact(
    name: &str,
    resource_type: &str,
    data: &str,
    download_url: Option<&str>,
) -> BuildArtifact {
    BuildArtifact {
        name: name.to_string(),
        resource: ArtifactResourceData {
            resource_type: resource_type.to_string(),
            data: data.to_string(),
            download_url: download_url.map(str::to_string),
        },
    }
}

pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.service.base_url = BASE_URL.to_string();
    config
}

/// Helper to create a downloader wired to fakes
pub(crate) fn create_test_downloader(
    api: Arc<FakeBuildApi>,
    engine: Arc<RecordingEngine>,
) -> ArtifactDownloader {
    create_test_downloader_with(test_config(), api, engine)
}

pub(crate) fn create_test_downloader_with(
    config: Config,
    api: Arc<FakeBuildApi>,
    engine: Arc<RecordingEngine>,
) -> ArtifactDownloader {
    ArtifactDownloader::with_collaborators(config, api, engine).unwrap()
}

/// In-memory build service
#[derive(Default)]
pub(crate) struct FakeBuildApi {
    builds: HashMap<DefinitionId, Vec<BuildId>>,
    artifacts: Vec<BuildArtifact>,
    calls: Mutex<Vec<String>>,
}

impl FakeBuildApi {
    pub(crate) fn with_artifacts(artifacts: Vec<BuildArtifact>) -> Self {
        Self {
            artifacts,
            ..Self::default()
        }
    }

    pub(crate) fn with_builds(mut self, definition: i64, builds: &[i64]) -> Self {
        self.builds.insert(
            DefinitionId(definition),
            builds.iter().copied().map(BuildId).collect(),
        );
        self
    }

    /// Names of the methods called so far, in order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl BuildMetadataClient for FakeBuildApi {
    async fn get_builds(
        &self,
        _project: Option<&str>,
        definitions: &[DefinitionId],
    ) -> Result<Vec<BuildSummary>> {
        self.record("get_builds");
        Ok(definitions
            .iter()
            .filter_map(|d| self.builds.get(d))
            .flatten()
            .map(|id| BuildSummary {
                id: *id,
                build_number: None,
            })
            .collect())
    }

    async fn get_artifact(
        &self,
        _build_id: BuildId,
        name: &str,
        _project: Option<&str>,
    ) -> Result<Option<BuildArtifact>> {
        self.record("get_artifact");
        Ok(self.artifacts.iter().find(|a| a.name == name).cloned())
    }

    async fn get_artifacts(
        &self,
        _build_id: BuildId,
        _project: Option<&str>,
    ) -> Result<Vec<BuildArtifact>> {
        self.record("get_artifacts");
        Ok(self.artifacts.clone())
    }
}

/// What a job handed to the engine looked like
#[derive(Clone, Debug)]
pub(crate) struct RecordedJob {
    pub source: String,
    pub destination: String,
    pub pattern: String,
    pub parallel_limit: usize,
    pub verbose: bool,
}

/// Engine that records jobs instead of moving bytes.
///
/// Behavior is keyed on a substring of the source description.
#[derive(Default)]
pub(crate) struct RecordingEngine {
    jobs: Mutex<Vec<RecordedJob>>,
    completed: Mutex<Vec<String>>,
    failing: Vec<String>,
    panicking: Vec<String>,
    delays: Vec<(String, Duration)>,
    elapsed: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing_on(mut self, marker: &str) -> Self {
        self.failing.push(marker.to_string());
        self
    }

    pub(crate) fn panicking_on(mut self, marker: &str) -> Self {
        self.panicking.push(marker.to_string());
        self
    }

    pub(crate) fn delaying(mut self, marker: &str, delay: Duration) -> Self {
        self.delays.push((marker.to_string(), delay));
        self
    }

    /// Report this elapsed time for every successful job
    pub(crate) fn reporting_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    pub(crate) fn jobs(&self) -> Vec<RecordedJob> {
        self.jobs.lock().unwrap().clone()
    }

    /// Sources of the jobs that ran to the end, in completion order
    pub(crate) fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }

    /// Highest number of jobs observed running at once
    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransferEngine for RecordingEngine {
    async fn process_items(
        &self,
        source: Arc<dyn SourceProvider>,
        destination: Arc<dyn DestinationProvider>,
        options: TransferOptions,
    ) -> std::result::Result<TransferStats, TransferError> {
        let desc = source.describe();
        self.jobs.lock().unwrap().push(RecordedJob {
            source: desc.clone(),
            destination: destination.describe(),
            pattern: options.item_pattern.as_str().to_string(),
            parallel_limit: options.parallel_limit,
            verbose: options.verbose,
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .iter()
            .find(|(marker, _)| desc.contains(marker.as_str()))
            .map(|(_, d)| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.iter().any(|m| desc.contains(m.as_str())) {
            panic!("engine crashed on {desc}");
        }

        self.completed.lock().unwrap().push(desc.clone());

        if self.failing.iter().any(|m| desc.contains(m.as_str())) {
            return Err(TransferError::Listing {
                location: desc,
                reason: "simulated failure".to_string(),
            });
        }

        Ok(TransferStats {
            items: 2,
            bytes: 10,
            elapsed: self.elapsed.unwrap_or(Duration::from_millis(1)),
        })
    }
}
