//! Run CLI command.

use crate::config::DigestConfig;
use crate::github::GitHubClient;
use crate::rendering::ReportWriter;
use crate::services::{DigestOutcome, DigestPipeline, DigestRequest, Scorer, SeenRepoCache};
use crate::{Result, parse_date};

/// Default search topic.
pub const DEFAULT_TOPIC: &str = "ai";
/// Default report size.
pub const DEFAULT_LIMIT: usize = 10;

/// Run command handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCommand {
    topic: String,
    limit: usize,
    date: Option<String>,
}

impl Default for RunCommand {
    fn default() -> Self {
        Self::new(DEFAULT_TOPIC, DEFAULT_LIMIT)
    }
}

impl RunCommand {
    /// Creates a run command.
    #[must_use]
    pub fn new(topic: impl Into<String>, limit: usize) -> Self {
        Self {
            topic: topic.into(),
            limit,
            date: None,
        }
    }

    /// Overrides the digest day (`YYYY-MM-DD`).
    #[must_use]
    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }

    /// Builds the pipeline request.
    ///
    /// # Errors
    ///
    /// Returns an error if the date override does not parse.
    pub fn request(&self) -> Result<DigestRequest> {
        let request = DigestRequest::new(self.topic.clone(), self.limit);
        match &self.date {
            Some(date) => Ok(request.with_date(parse_date(date)?)),
            None => Ok(request),
        }
    }

    /// Runs the digest against GitHub.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is invalid or the report cannot be written.
    pub fn execute(&self, config: &DigestConfig) -> Result<DigestOutcome> {
        let request = self.request()?;
        let pipeline = DigestPipeline::new(
            GitHubClient::new(&config.github_config()),
            Scorer::new(Some(config.preferences())),
            SeenRepoCache::new(&config.cache_path),
            ReportWriter::new(&config.report_dir),
            config.cache_days,
        );
        pipeline.run(&request)
    }

    /// Formats an outcome for the terminal.
    #[must_use]
    pub fn summary(outcome: &DigestOutcome) -> String {
        match outcome {
            DigestOutcome::NoRepositories => "No repositories fetched".to_string(),
            DigestOutcome::NothingNew { filtered } => {
                format!("No new repositories ({filtered} seen recently)")
            },
            DigestOutcome::Generated {
                report_path,
                included,
                filtered,
            } => format!(
                "Wrote {} with {} repositories ({filtered} filtered as recently seen)",
                report_path.display(),
                included.len()
            ),
        }
    }
}
