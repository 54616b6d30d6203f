//! REST client for build metadata

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use super::BuildMetadataClient;
use crate::auth::{self, AuthProvider};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::types::{BuildArtifact, BuildId, BuildSummary, DefinitionId};

/// Envelope the service wraps every list response in
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ListResponse<T> {
    #[serde(default)]
    value: Vec<T>,
}

/// Build metadata client over the service's REST API
pub struct HttpBuildClient {
    client: reqwest::Client,
    base_url: Url,
    api_version: String,
    auth: Arc<dyn AuthProvider>,
}

impl HttpBuildClient {
    /// Create a client from service settings
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_version: config.api_version.clone(),
            auth: auth::from_token(config.access_token.as_deref()),
        })
    }

    /// Create a client sharing an existing HTTP client and auth provider
    pub fn with_client(
        client: reqwest::Client,
        config: &ServiceConfig,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim())?;
        Ok(Self {
            client,
            base_url,
            api_version: config.api_version.clone(),
            auth,
        })
    }

    /// `{base}[/{project}]/_apis/{segments...}?api-version=...`
    fn endpoint(&self, project: Option<&str>, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                Error::config("service.base_url", "base URL cannot carry a path")
            })?;
            path.pop_if_empty();
            if let Some(project) = project.filter(|p| !p.is_empty()) {
                path.push(project);
            }
            path.extend(std::iter::once("_apis").chain(segments.iter().copied()));
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        Ok(url)
    }

    /// GET a URL and decode its JSON body; 404 maps to `None`
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        tracing::debug!(url = %url, "build service request");
        let response = self
            .auth
            .authorize(self.client.get(url.clone()))
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                url: url.to_string(),
                message,
            });
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) || body.as_ref() == b"null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&body)?))
    }
}

#[async_trait]
impl BuildMetadataClient for HttpBuildClient {
    async fn get_builds(
        &self,
        project: Option<&str>,
        definitions: &[DefinitionId],
    ) -> Result<Vec<BuildSummary>> {
        let mut url = self.endpoint(project, &["build", "builds"])?;
        let ids = definitions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut().append_pair("definitions", &ids);

        let list: Option<ListResponse<BuildSummary>> = self.get_json(url).await?;
        Ok(list.map(|l| l.value).unwrap_or_default())
    }

    async fn get_artifact(
        &self,
        build_id: BuildId,
        name: &str,
        project: Option<&str>,
    ) -> Result<Option<BuildArtifact>> {
        let build = build_id.to_string();
        let mut url = self.endpoint(project, &["build", "builds", build.as_str(), "artifacts"])?;
        url.query_pairs_mut().append_pair("artifactName", name);

        self.get_json(url).await
    }

    async fn get_artifacts(
        &self,
        build_id: BuildId,
        project: Option<&str>,
    ) -> Result<Vec<BuildArtifact>> {
        let build = build_id.to_string();
        let url = self.endpoint(project, &["build", "builds", build.as_str(), "artifacts"])?;

        let list: Option<ListResponse<BuildArtifact>> = self.get_json(url).await?;
        Ok(list.map(|l| l.value).unwrap_or_default())
    }
}
