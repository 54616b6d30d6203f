//! Request authorization for the build service
//!
//! Every HTTP request the crate sends (build metadata, container listings,
//! item content) goes through an [`AuthProvider`].

use std::sync::Arc;

/// Adds credentials to an outgoing request
pub trait AuthProvider: Send + Sync {
    /// Return the request with authorization applied
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Personal access token sent as HTTP basic auth with an empty user name
pub struct PersonalAccessToken {
    token: String,
}

impl PersonalAccessToken {
    /// Wrap a token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonalAccessToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthProvider for PersonalAccessToken {
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth("", Some(&self.token))
    }

    fn name(&self) -> &'static str {
        "pat"
    }
}

/// OAuth bearer token
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    /// Wrap a token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthProvider for BearerToken {
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(&self.token)
    }

    fn name(&self) -> &'static str {
        "bearer"
    }
}

/// Sends requests without credentials
#[derive(Debug, Default)]
pub struct Anonymous;

impl AuthProvider for Anonymous {
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
    }

    fn name(&self) -> &'static str {
        "anonymous"
    }
}

/// Pick the auth provider for an optional access token
pub fn from_token(token: Option<&str>) -> Arc<dyn AuthProvider> {
    match token {
        Some(t) if !t.is_empty() => Arc::new(PersonalAccessToken::new(t)),
        _ => Arc::new(Anonymous),
    }
}
