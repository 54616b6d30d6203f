//! Artifact download orchestration split into focused submodules.
//!
//! - [`validation`] - Build/definition linkage check
//! - [`resolution`] - Artifact list and item pattern from the download mode
//! - [`dispatch`] - Endpoint construction and job fan-out
//! - [`aggregation`] - Job fan-in and the overall outcome

mod aggregation;
mod dispatch;
mod resolution;
mod validation;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use dispatch::TransferJob;
pub use resolution::ResolvedArtifacts;

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::auth::{self, AuthProvider};
use crate::build_api::{BuildMetadataClient, HttpBuildClient};
use crate::config::Config;
use crate::error::Result;
use crate::pattern::ItemPattern;
use crate::transfer::{ArtifactEngine, TransferEngine, TransferOptions};
use crate::types::{BuildReference, DownloadRequest, DownloadSummary, Event};

const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Resolves a build's artifacts and downloads them concurrently
///
/// One call to [`download`](Self::download) runs the full pipeline:
///
/// 1. Check the build belongs to the requested definition (fail-fast)
/// 2. Resolve the artifact list and item pattern
/// 3. Plan one transfer job per supported artifact (fail-fast on malformed data)
/// 4. Launch every job at once and wait for all of them
/// 5. Succeed only if every job succeeded
#[derive(Clone)]
pub struct ArtifactDownloader {
    pub(crate) config: Arc<Config>,
    pub(crate) build_api: Arc<dyn BuildMetadataClient>,
    pub(crate) engine: Arc<dyn TransferEngine>,
    pub(crate) http: reqwest::Client,
    pub(crate) auth: Arc<dyn AuthProvider>,
    pub(crate) event_tx: broadcast::Sender<Event>,
}

impl ArtifactDownloader {
    /// Create a downloader using the REST build client and the default engine
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::new();
        let auth = auth::from_token(config.service.access_token.as_deref());
        let build_api = Arc::new(HttpBuildClient::with_client(
            http.clone(),
            &config.service,
            Arc::clone(&auth),
        )?);
        Ok(Self::assemble(config, build_api, Arc::new(ArtifactEngine::new()), http, auth))
    }

    /// Create a downloader with custom collaborators
    pub fn with_collaborators(
        config: Config,
        build_api: Arc<dyn BuildMetadataClient>,
        engine: Arc<dyn TransferEngine>,
    ) -> Result<Self> {
        config.validate()?;
        let auth = auth::from_token(config.service.access_token.as_deref());
        Ok(Self::assemble(config, build_api, engine, reqwest::Client::new(), auth))
    }

    fn assemble(
        config: Config,
        build_api: Arc<dyn BuildMetadataClient>,
        engine: Arc<dyn TransferEngine>,
        http: reqwest::Client,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(config),
            build_api,
            engine,
            http,
            auth,
            event_tx,
        }
    }

    /// Subscribe to download events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The configuration this downloader was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Download the requested artifacts of a build
    ///
    /// Validation, resolution and malformed container data abort before any
    /// job is launched. Once jobs are launched they all run to completion; if
    /// any failed the result is [`Error::TransfersFailed`](crate::Error::TransfersFailed)
    /// listing every failed artifact.
    pub async fn download(
        &self,
        build: &BuildReference,
        request: &DownloadRequest,
    ) -> Result<DownloadSummary> {
        let started_at = Utc::now();
        let project = build.project.as_deref();
        let build_id = build.build_id;

        validation::validate_build_linkage(
            self.build_api.as_ref(),
            project,
            build_id,
            build.definition_id,
        )
        .await?;
        self.event_tx.send(Event::ValidationPassed { build_id }).ok();

        let resolved = resolution::resolve_artifacts(
            self.build_api.as_ref(),
            project,
            build_id,
            &request.mode,
            self.config.empty_artifacts,
        )
        .await?;
        self.event_tx
            .send(Event::ArtifactsResolved {
                count: resolved.artifacts.len(),
                pattern: resolved.pattern.clone(),
            })
            .ok();

        let options = TransferOptions {
            item_pattern: ItemPattern::new(&resolved.pattern)?,
            parallel_limit: self.config.transfer.parallel_limit,
            verbose: self.config.transfer.verbose,
        };

        let endpoints = dispatch::Endpoints {
            http: &self.http,
            base_url: &self.config.service.base_url,
            auth: &self.auth,
            destination: &request.destination,
        };
        let plan = dispatch::plan_jobs(&resolved.artifacts, &endpoints, &options, &self.event_tx)?;

        let launched = dispatch::launch_jobs(plan.jobs, &self.engine, &self.event_tx);
        let outcomes = aggregation::join_jobs(launched).await;

        aggregation::summarize(aggregation::SummaryParams {
            build_id,
            pattern: resolved.pattern,
            outcomes,
            skipped: plan.skipped,
            started_at,
            event_tx: &self.event_tx,
        })
    }
}
