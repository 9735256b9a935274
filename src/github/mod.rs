//! GitHub repository search.
//!
//! The pipeline only depends on [`RepoSource`]; [`GitHubClient`] is the
//! production implementation backed by the GitHub search API.

mod client;
mod types;

pub use client::GitHubClient;
pub use types::{SearchItem, SearchResponse};

use crate::models::Repository;
use secrecy::SecretString;
use std::time::Duration;

/// A source of candidate repositories.
///
/// Implementations absorb their own failures: a timeout or a bad response
/// yields fewer repositories (possibly none), never an error.
pub trait RepoSource {
    /// Returns the source name for logging.
    fn name(&self) -> &'static str;

    /// Fetches up to `limit` repositories for `topic`.
    fn fetch(&self, topic: &str, limit: usize) -> Vec<Repository>;
}

/// HTTP settings for the GitHub client.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL.
    pub endpoint: String,
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
    /// Optional token for authenticated (higher rate limit) requests.
    pub token: Option<SecretString>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            endpoint: GitHubClient::DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 10_000,
            connect_timeout_ms: 3_000,
            token: None,
        }
    }
}

impl GitHubConfig {
    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the API token.
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }
}

/// Builds a blocking HTTP client with the configured timeouts.
#[must_use]
pub fn build_http_client(config: &GitHubConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder().user_agent(GitHubClient::USER_AGENT);
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build GitHub HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}
