//! End-to-end digest runs against a fixture-backed repository source.
//!
//! Each run goes through the real cache file and report directory in a
//! temporary workspace, so the tests cover what a daily cron run observes.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::{NaiveDate, TimeZone, Utc};
use repodigest::github::SearchResponse;
use repodigest::services::{DigestOutcome, DigestPipeline, DigestRequest, Scorer, SeenRepoCache};
use repodigest::{Preferences, RepoSource, ReportWriter, Repository};
use std::fs;
use tempfile::TempDir;

const FIXTURE: &str = include_str!("fixtures/search_response.json");

/// Serves the fixture search response, honouring the requested limit.
struct FixtureSource {
    repos: Vec<Repository>,
}

impl FixtureSource {
    fn load() -> Self {
        let response: SearchResponse = serde_json::from_str(FIXTURE).expect("fixture parses");
        Self {
            repos: response.items.into_iter().map(Repository::from).collect(),
        }
    }
}

impl RepoSource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    fn fetch(&self, _topic: &str, limit: usize) -> Vec<Repository> {
        self.repos.iter().take(limit).cloned().collect()
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn pipeline(&self, cache_days: u32) -> DigestPipeline<FixtureSource> {
        let scorer = Scorer::new(Some(Preferences::default()))
            .with_reference_time(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());
        DigestPipeline::new(
            FixtureSource::load(),
            scorer,
            SeenRepoCache::new(self.dir.path().join("cache").join("seen_repos.json")),
            ReportWriter::new(self.dir.path().join("daily")),
            cache_days,
        )
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn names(outcome: &DigestOutcome) -> Vec<String> {
    match outcome {
        DigestOutcome::Generated { included, .. } => included
            .iter()
            .map(|r| r.repository.name.clone())
            .collect(),
        other => unreachable!("expected a report, got {other:?}"),
    }
}

#[test]
fn test_first_run_ranks_and_reports() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(7);

    let outcome = pipeline
        .run(&DigestRequest::new("ai", 10).with_date(day(5)))
        .unwrap();

    // vector-store carries the popularity signals and the "rag" boost.
    assert_eq!(names(&outcome), vec!["vector-store", "ai-notes", "tiny-agent"]);

    let DigestOutcome::Generated {
        report_path,
        included,
        filtered,
    } = outcome
    else {
        unreachable!();
    };
    assert_eq!(filtered, 0);
    assert!((included[0].score - 6705.0).abs() < 1e-6);
    assert!((included[1].score - 2043.0).abs() < 1e-6);

    let report = fs::read_to_string(report_path).unwrap();
    assert!(report.contains("# GitHub Digest - 2024-01-05"));
    assert!(report.contains("## 1. [vector-store](https://github.com/acme/vector-store)"));
    assert!(report.contains("No description provided"));
    assert!(report.contains("Language: Unknown"));
}

#[test]
fn test_cache_records_each_reported_repo() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(7);

    pipeline
        .run(&DigestRequest::new("ai", 2).with_date(day(5)))
        .unwrap();

    let store = pipeline.cache().load();
    assert_eq!(store.len(), 2);
    assert_eq!(store.get("acme/vector-store").map(String::as_str), Some("2024-01-05"));
    assert!(store.contains_key("acme/tiny-agent"));
    assert!(!store.contains_key("someone/ai-notes"));
}

#[test]
fn test_next_day_only_reports_new_repos() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(7);

    pipeline
        .run(&DigestRequest::new("ai", 2).with_date(day(5)))
        .unwrap();
    let outcome = pipeline
        .run(&DigestRequest::new("ai", 2).with_date(day(6)))
        .unwrap();

    assert_eq!(names(&outcome), vec!["ai-notes"]);
    assert!(matches!(outcome, DigestOutcome::Generated { filtered: 2, .. }));
}

#[test]
fn test_everything_seen_writes_no_report() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(7);

    pipeline
        .run(&DigestRequest::new("ai", 10).with_date(day(5)))
        .unwrap();
    let outcome = pipeline
        .run(&DigestRequest::new("ai", 10).with_date(day(6)))
        .unwrap();

    assert_eq!(outcome, DigestOutcome::NothingNew { filtered: 3 });
    assert!(!ws.dir.path().join("daily").join("2024-01-06.md").exists());
}

#[test]
fn test_repos_resurface_after_window() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(7);

    pipeline
        .run(&DigestRequest::new("ai", 10).with_date(day(1)))
        .unwrap();

    // Exactly seven days later the entries are still inside the window.
    let inside = pipeline
        .run(&DigestRequest::new("ai", 10).with_date(day(8)))
        .unwrap();
    assert_eq!(inside, DigestOutcome::NothingNew { filtered: 3 });

    let outside = pipeline
        .run(&DigestRequest::new("ai", 10).with_date(day(9)))
        .unwrap();
    assert_eq!(names(&outside).len(), 3);
}

#[test]
fn test_run_sweeps_expired_entries() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(7);
    let cache_path = pipeline.cache().path().to_path_buf();
    fs::create_dir_all(cache_path.parent().unwrap()).unwrap();
    fs::write(
        &cache_path,
        r#"{"gone/stale": "2023-12-01", "broken/date": "yesterday"}"#,
    )
    .unwrap();

    pipeline
        .run(&DigestRequest::new("ai", 1).with_date(day(5)))
        .unwrap();

    let store = pipeline.cache().load();
    assert_eq!(store.keys().collect::<Vec<_>>(), vec!["acme/vector-store"]);
}

#[test]
fn test_corrupt_cache_does_not_block_run() {
    let ws = Workspace::new();
    let pipeline = ws.pipeline(7);
    let cache_path = pipeline.cache().path().to_path_buf();
    fs::create_dir_all(cache_path.parent().unwrap()).unwrap();
    fs::write(&cache_path, "{{{{").unwrap();

    let outcome = pipeline
        .run(&DigestRequest::new("ai", 10).with_date(day(5)))
        .unwrap();

    assert_eq!(names(&outcome).len(), 3);
    assert_eq!(pipeline.cache().load().len(), 3);
}
