//! # repodigest
//!
//! Daily digest of trending GitHub repositories.
//!
//! repodigest fetches candidate repositories for a topic, suppresses the ones
//! already surfaced within a retention window, ranks the rest by a weighted
//! multi-signal score and writes a Markdown report.
//!
//! ## Pipeline
//!
//! ```text
//! GitHub search ──► SeenRepoCache::filter_seen ──► Scorer::rank
//!                                                      │
//!          report ◄── ReportWriter ◄── SeenRepoCache::record + sweep
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use repodigest::{Preferences, Scorer, SeenRepoCache};
//!
//! let cache = SeenRepoCache::new("cache/seen_repos.json");
//! let (fresh, filtered) = cache.filter_seen(repos, 7);
//!
//! let scorer = Scorer::new(Some(Preferences::default()));
//! let ranked = scorer.rank(fresh, "llm");
//! cache.record(&ranked, None)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod github;
pub mod models;
pub mod observability;
pub mod rendering;
pub mod services;

pub use config::DigestConfig;
pub use github::{GitHubClient, RepoSource};
pub use models::{Preferences, RankedRepository, RepoId, Repository};
pub use rendering::ReportWriter;
pub use services::{
    CacheStore, DigestOutcome, DigestPipeline, DigestRequest, Scorer, SeenRepoCache, SweepResult,
};

/// Error type for repodigest operations.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed CLI arguments such as a bad `--date` |
/// | `OperationFailed` | Filesystem writes, config parsing, logging setup |
///
/// Cache reads and per-item parse failures never surface as errors; they
/// degrade to empty caches and zeroed score components instead.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Builds an [`Error::OperationFailed`] from an operation name and any displayable cause.
    pub fn operation(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::OperationFailed {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for repodigest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Date format used for cache entries and report file names.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns today's date on the local wall clock.
///
/// Cache entries and report names are keyed by the operator's calendar day,
/// not UTC.
#[must_use]
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parses a `YYYY-MM-DD` date string.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when the string is not a calendar date.
pub fn parse_date(value: &str) -> Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|e| Error::InvalidInput(format!("'{value}' is not a YYYY-MM-DD date: {e}")))
}
