//! Blocking GitHub search client.

use super::types::SearchResponse;
use super::{GitHubConfig, RepoSource, build_http_client};
use crate::models::Repository;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Maximum page size accepted by the search API.
const MAX_PER_PAGE: usize = 100;

/// Minimum star count for a repository to be considered.
const MIN_STARS: u32 = 50;

/// GitHub search API client.
pub struct GitHubClient {
    /// API base URL.
    endpoint: String,
    /// Optional API token.
    token: Option<SecretString>,
    /// HTTP client.
    client: reqwest::blocking::Client,
}

impl GitHubClient {
    /// Default API endpoint.
    pub const DEFAULT_ENDPOINT: &'static str = "https://api.github.com";

    /// User agent sent with every request; GitHub rejects requests without one.
    pub const USER_AGENT: &'static str = concat!("repodigest/", env!("CARGO_PKG_VERSION"));

    /// Creates a client from HTTP settings.
    #[must_use]
    pub fn new(config: &GitHubConfig) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client: build_http_client(config),
        }
    }

    /// Builds the search query for a topic.
    #[must_use]
    pub fn query_for(topic: &str) -> String {
        format!("{topic} stars:>{MIN_STARS}")
    }

    /// Runs one search request.
    fn search(&self, topic: &str, limit: usize) -> Result<Vec<Repository>> {
        let per_page = limit.min(MAX_PER_PAGE).to_string();
        let query = Self::query_for(topic);

        let mut request = self
            .client
            .get(format!("{}/search/repositories", self.endpoint))
            .header("Accept", "application/vnd.github.v3+json")
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().map_err(|e| {
            let error_kind = if e.is_timeout() {
                "timeout"
            } else if e.is_connect() {
                "connect"
            } else if e.is_request() {
                "request"
            } else {
                "unknown"
            };
            warn!(
                error = %e,
                error_kind,
                is_timeout = e.is_timeout(),
                "GitHub search request failed"
            );
            Error::operation("github_search", format!("{error_kind} error: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            warn!(status = %status, body = %body, "GitHub search returned error status");
            return Err(Error::operation(
                "github_search",
                format!("API returned status: {status}"),
            ));
        }

        let body: SearchResponse = response.json().map_err(|e| {
            warn!(error = %e, "Failed to parse GitHub search response");
            Error::operation("github_search_response", e)
        })?;

        Ok(body
            .items
            .into_iter()
            .take(limit)
            .map(Repository::from)
            .collect())
    }
}

impl RepoSource for GitHubClient {
    fn name(&self) -> &'static str {
        "github"
    }

    #[instrument(skip(self), fields(source = "github"))]
    fn fetch(&self, topic: &str, limit: usize) -> Vec<Repository> {
        if limit == 0 {
            return Vec::new();
        }

        let start = Instant::now();
        let result = self.search(topic, limit);
        let duration_ms = start.elapsed().as_millis();

        metrics::histogram!(
            "digest_fetch_duration_ms",
            "status" => if result.is_ok() { "success" } else { "error" }
        )
        .record(duration_ms as f64);

        match result {
            Ok(repos) => {
                info!(count = repos.len(), duration_ms, "Fetched repositories");
                repos
            },
            Err(e) => {
                warn!(error = %e, duration_ms, "Fetch failed, continuing with no repositories");
                Vec::new()
            },
        }
    }
}
