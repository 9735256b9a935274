//! Daily digest pipeline.
//!
//! ```text
//! fetch(limit * 2) -> filter_seen -> truncate(limit) -> rank -> record -> sweep -> write
//! ```

use crate::github::RepoSource;
use crate::models::RankedRepository;
use crate::rendering::ReportWriter;
use crate::services::{Scorer, SeenRepoCache};
use crate::{DATE_FORMAT, Result};
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Parameters for one digest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestRequest {
    /// Search topic, also used as the ranking keyword.
    pub topic: String,
    /// Maximum repositories in the report.
    pub limit: usize,
    /// Day the digest is generated for.
    pub date: NaiveDate,
}

impl DigestRequest {
    /// Creates a request for today.
    #[must_use]
    pub fn new(topic: impl Into<String>, limit: usize) -> Self {
        Self {
            topic: topic.into(),
            limit,
            date: crate::today(),
        }
    }

    /// Sets the digest day.
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

/// Result of a digest run.
#[derive(Debug, Clone, PartialEq)]
pub enum DigestOutcome {
    /// The source returned nothing.
    NoRepositories,
    /// Everything fetched was seen within the window.
    NothingNew {
        /// Repositories suppressed by the cache.
        filtered: usize,
    },
    /// A report was written.
    Generated {
        /// Path of the written report.
        report_path: PathBuf,
        /// Ranked repositories included in the report.
        included: Vec<RankedRepository>,
        /// Repositories suppressed by the cache.
        filtered: usize,
    },
}

/// Fetches, deduplicates, ranks and reports repositories.
pub struct DigestPipeline<S: RepoSource> {
    source: S,
    scorer: Scorer,
    cache: SeenRepoCache,
    writer: ReportWriter,
    cache_days: u32,
}

impl<S: RepoSource> DigestPipeline<S> {
    /// Creates a pipeline.
    #[must_use]
    pub const fn new(
        source: S,
        scorer: Scorer,
        cache: SeenRepoCache,
        writer: ReportWriter,
        cache_days: u32,
    ) -> Self {
        Self {
            source,
            scorer,
            cache,
            writer,
            cache_days,
        }
    }

    /// Returns the seen-repo cache.
    #[must_use]
    pub const fn cache(&self) -> &SeenRepoCache {
        &self.cache
    }

    /// Runs the pipeline once.
    ///
    /// Twice `limit` repositories are requested so that suppressing recently
    /// seen ones still leaves enough to fill the report. Failing to record or
    /// sweep the cache is logged and does not abort the run.
    ///
    /// # Errors
    ///
    /// Returns an error if the report cannot be written.
    #[instrument(skip(self), fields(source = self.source.name(), topic = %request.topic, limit = request.limit))]
    pub fn run(&self, request: &DigestRequest) -> Result<DigestOutcome> {
        let fetched = self
            .source
            .fetch(&request.topic, request.limit.saturating_mul(2));
        if fetched.is_empty() {
            warn!("No repositories fetched");
            return Ok(DigestOutcome::NoRepositories);
        }
        let fetched_count = fetched.len();

        let (mut fresh, filtered) =
            self.cache
                .filter_seen_on(fetched, self.cache_days, request.date);
        fresh.truncate(request.limit);
        if fresh.is_empty() {
            info!(filtered, "All fetched repositories were seen recently");
            return Ok(DigestOutcome::NothingNew { filtered });
        }

        let included = self.scorer.rank(fresh, &request.topic);

        if let Err(e) = self.cache.record(&included, Some(request.date)) {
            warn!(error = %e, "Failed to record seen repositories");
        }
        if let Err(e) = self.cache.sweep_on(self.cache_days, request.date) {
            warn!(error = %e, "Failed to sweep seen-repo cache");
        }

        let report_path = self.writer.write(&included, &request.topic, request.date)?;

        info!(
            fetched = fetched_count,
            filtered,
            included = included.len(),
            date = %request.date.format(DATE_FORMAT),
            "Digest generated"
        );

        Ok(DigestOutcome::Generated {
            report_path,
            included,
            filtered,
        })
    }
}
