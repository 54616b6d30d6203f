//! Configuration types for build-artifact-dl

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the per-job parallel limit
pub const PARALLEL_LIMIT_ENV: &str = "RELEASE_ARTIFACT_DOWNLOAD_PARALLELLIMIT";
/// Environment variable enabling verbose transfers
pub const DEBUG_ENV: &str = "SYSTEM_DEBUG";
/// Environment variable carrying the build service base URL
pub const COLLECTION_URI_ENV: &str = "SYSTEM_TEAMFOUNDATIONCOLLECTIONURI";
/// Environment variable carrying the service access token
pub const ACCESS_TOKEN_ENV: &str = "SYSTEM_ACCESSTOKEN";

/// Build service connection settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Collection base URL, e.g. `https://dev.example.com/org`
    #[serde(default)]
    pub base_url: String,

    /// Personal access token used for every request (None = anonymous)
    #[serde(default)]
    pub access_token: Option<String>,

    /// REST API version sent with build API calls (default: "5.0")
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: None,
            api_version: default_api_version(),
        }
    }
}

/// Transfer behavior settings, passed through to the transfer engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Maximum number of items a single job transfers at once (default: 8)
    #[serde(default = "default_parallel_limit")]
    pub parallel_limit: usize,

    /// Log every item as it is transferred
    #[serde(default)]
    pub verbose: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            parallel_limit: default_parallel_limit(),
            verbose: false,
        }
    }
}

/// What to do when `All` mode finds no artifacts on the build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyArtifactsPolicy {
    /// Nothing to do: the invocation succeeds with zero jobs
    #[default]
    Succeed,
    /// Treat an empty build as an error
    Fail,
}

/// Main configuration for [`ArtifactDownloader`](crate::ArtifactDownloader)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Build service connection
    #[serde(default)]
    pub service: ServiceConfig,

    /// Transfer engine options
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Handling of builds without artifacts
    #[serde(default)]
    pub empty_artifacts: EmptyArtifactsPolicy,
}

impl Config {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides_with(|key| std::env::var(key).ok());
        config
    }

    /// Apply environment overrides using a custom lookup
    ///
    /// - `RELEASE_ARTIFACT_DOWNLOAD_PARALLELLIMIT`: positive integer replaces the
    ///   parallel limit; zero or garbage leaves it unchanged
    /// - `SYSTEM_DEBUG`: verbose unless the value is blank or `false` (any case)
    /// - `SYSTEM_TEAMFOUNDATIONCOLLECTIONURI`, `SYSTEM_ACCESSTOKEN`: connection
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(PARALLEL_LIMIT_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => self.transfer.parallel_limit = limit,
                _ => tracing::debug!(value = %raw, "ignoring invalid parallel limit override"),
            }
        }

        if let Some(debug) = lookup(DEBUG_ENV) {
            let debug = debug.trim();
            self.transfer.verbose = !debug.is_empty() && !debug.eq_ignore_ascii_case("false");
        }

        if let Some(uri) = lookup(COLLECTION_URI_ENV).filter(|u| !u.trim().is_empty()) {
            self.service.base_url = uri.trim().to_string();
        }

        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|t| !t.is_empty()) {
            self.service.access_token = Some(token);
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.service.base_url.trim().is_empty() {
            return Err(Error::config(
                "service.base_url",
                "build service base URL is required",
            ));
        }
        if self.transfer.parallel_limit == 0 {
            return Err(Error::config(
                "transfer.parallel_limit",
                "parallel limit must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_api_version() -> String {
    "5.0".to_string()
}

fn default_parallel_limit() -> usize {
    8
}
