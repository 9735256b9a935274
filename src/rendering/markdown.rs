//! Markdown digest reports.

use crate::models::RankedRepository;
use crate::{DATE_FORMAT, Error, Result};
use chrono::NaiveDate;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Writes one Markdown report per day into a directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    report_dir: PathBuf,
}

impl ReportWriter {
    /// Creates a writer targeting `report_dir`.
    #[must_use]
    pub fn new(report_dir: impl Into<PathBuf>) -> Self {
        Self {
            report_dir: report_dir.into(),
        }
    }

    /// Returns the report directory.
    #[must_use]
    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Returns the path a report for `date` is written to.
    #[must_use]
    pub fn report_path(&self, date: NaiveDate) -> PathBuf {
        self.report_dir
            .join(format!("{}.md", date.format(DATE_FORMAT)))
    }

    /// Renders the report body.
    #[must_use]
    pub fn render(repos: &[RankedRepository], topic: &str, date: NaiveDate) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# GitHub Digest - {}", date.format(DATE_FORMAT));
        let _ = writeln!(out);
        let _ = writeln!(out, "**Topic:** {topic}");
        let _ = writeln!(out, "**Repositories:** {}", repos.len());
        let _ = writeln!(out);
        let _ = writeln!(out, "---");

        for (rank, ranked) in repos.iter().enumerate() {
            let repo = &ranked.repository;
            let _ = writeln!(out);
            let _ = writeln!(out, "## {}. [{}]({})", rank + 1, repo.name, repo.url);
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", repo.description);
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Score: {:.1} | Stars: {} | Forks: {} | Language: {}",
                ranked.score, repo.stars, repo.forks, repo.language
            );
            if !repo.topics.is_empty() {
                let _ = writeln!(out, "Topics: {}", repo.topics.join(", "));
            }
        }

        out
    }

    /// Renders and writes the report for `date`, creating the directory if
    /// needed. An existing report for the same day is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    #[instrument(skip(self, repos), fields(repos = repos.len(), dir = %self.report_dir.display()))]
    pub fn write(&self, repos: &[RankedRepository], topic: &str, date: NaiveDate) -> Result<PathBuf> {
        fs::create_dir_all(&self.report_dir).map_err(|e| {
            Error::operation("create_report_dir", format!("{}: {e}", self.report_dir.display()))
        })?;

        let path = self.report_path(date);
        fs::write(&path, Self::render(repos, topic, date))
            .map_err(|e| Error::operation("write_report", format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), "Wrote digest report");
        Ok(path)
    }
}
