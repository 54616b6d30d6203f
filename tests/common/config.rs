//! Test configuration helpers for pointing a downloader at a mock service

use build_artifact_dl::{ArtifactDownloader, Config};

/// Token every mocked request is expected to carry
pub const TEST_TOKEN: &str = "test-token";

/// `Authorization` header value for [`TEST_TOKEN`] (basic auth, empty user)
pub const TEST_AUTH_HEADER: &str = "Basic OnRlc3QtdG9rZW4=";

/// Configuration targeting a mock service at `base_url`
pub fn mock_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.service.base_url = base_url.to_string();
    config.service.access_token = Some(TEST_TOKEN.to_string());
    config.transfer.parallel_limit = 4;
    config
}

/// Downloader with the default REST and transfer collaborators
pub fn mock_downloader(base_url: &str) -> ArtifactDownloader {
    ArtifactDownloader::new(mock_config(base_url)).expect("valid test configuration")
}
