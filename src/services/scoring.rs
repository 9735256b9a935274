//! Multi-signal repository scoring.
//!
//! # Formula
//!
//! ```text
//! stars   = min(stars / 10000, 1) * 10000
//! forks   = min(forks / 1000, 1)  * 1000
//! recency = recency_score(updated_at) * 1000
//! keyword = keyword_match(repo, keyword) * 1000
//!
//! base  = 0.4 * stars + 0.3 * forks + 0.2 * recency + 0.1 * keyword
//! score = base * preference_boost(repo, preferences)
//! ```
//!
//! Star and fork counts are clamped at fixed caps so one extreme value cannot
//! dominate. The components are brought to comparable magnitudes before the
//! weights apply. Popularity still scales linearly inside the cap, so star
//! count dominates for most repositories; the formula is kept as-is so scores
//! stay comparable with existing digests.

use crate::models::{Preferences, RankedRepository, Repository};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

/// Weight of the star component.
pub const STARS_WEIGHT: f64 = 0.4;
/// Weight of the fork component.
pub const FORKS_WEIGHT: f64 = 0.3;
/// Weight of the recency component.
pub const RECENCY_WEIGHT: f64 = 0.2;
/// Weight of the keyword component.
pub const KEYWORD_WEIGHT: f64 = 0.1;

/// Star count at which the star component saturates.
pub const STARS_CAP: f64 = 10_000.0;
/// Fork count at which the fork component saturates.
pub const FORKS_CAP: f64 = 1_000.0;
/// Scale applied to the unit-interval recency and keyword signals.
pub const SIGNAL_SCALE: f64 = 1_000.0;

/// Age in days at which the recency signal reaches zero.
pub const DEFAULT_RECENCY_DAYS: u32 = 365;

/// Parses an ISO-8601 timestamp. Timestamps without an offset are UTC.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Linear recency decay against the current time. See [`recency_score_at`].
#[must_use]
pub fn recency_score(updated_at: &str, max_days: u32) -> f64 {
    recency_score_at(updated_at, max_days, Utc::now())
}

/// Linear recency decay in `[0, 1]`.
///
/// Returns `1 - days_old / max_days` while `days_old < max_days` and `0`
/// afterwards. Unparseable timestamps score `0`. Timestamps ahead of `now`
/// count as zero days old.
#[must_use]
pub fn recency_score_at(updated_at: &str, max_days: u32, now: DateTime<Utc>) -> f64 {
    let Some(updated) = parse_timestamp(updated_at) else {
        return 0.0;
    };

    let days_old = (now - updated).num_days().max(0);
    let max_days = i64::from(max_days);
    if days_old >= max_days {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let fraction = days_old as f64 / max_days as f64;
    1.0 - fraction
}

/// Returns `1.0` if `keyword` appears in the repository, else `0.0`.
///
/// Matches are case-insensitive substrings of the name or description, or an
/// exact topic tag.
#[must_use]
pub fn keyword_match(repo: &Repository, keyword: &str) -> f64 {
    if mentions(repo, &keyword.to_lowercase()) {
        1.0
    } else {
        0.0
    }
}

/// Returns the boost multiplier for a repository.
///
/// The first preferred keyword that [`keyword_match`] would accept triggers
/// the configured multiplier; boosts never stack. Returns `1.0` when there
/// are no preferences, no preferred keywords, or no match.
#[must_use]
pub fn preference_boost(repo: &Repository, preferences: Option<&Preferences>) -> f64 {
    let Some(preferences) = preferences else {
        return 1.0;
    };

    let matched = preferences
        .preferred_topics
        .iter()
        .find(|topic| mentions(repo, &topic.to_lowercase()));

    match matched {
        Some(topic) => {
            debug!(repo = %repo.name, topic = %topic, "Preferred topic matched");
            preferences.topic_boost_multiplier
        },
        None => 1.0,
    }
}

/// Checks a lower-cased needle against name, description and topics.
fn mentions(repo: &Repository, needle: &str) -> bool {
    repo.name.to_lowercase().contains(needle)
        || repo.description.to_lowercase().contains(needle)
        || repo.topics.iter().any(|t| t.to_lowercase() == needle)
}

/// Per-component view of a score, mostly for logging and `--verbose` output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Capped star component, before weighting.
    pub stars: f64,
    /// Capped fork component, before weighting.
    pub forks: f64,
    /// Scaled recency component, before weighting.
    pub recency: f64,
    /// Scaled keyword component, before weighting.
    pub keyword: f64,
    /// Preference multiplier.
    pub boost: f64,
}

impl ScoreBreakdown {
    /// Weighted sum before the boost.
    #[must_use]
    #[allow(clippy::suboptimal_flops)]
    pub fn base(&self) -> f64 {
        (self.stars * STARS_WEIGHT)
            + (self.forks * FORKS_WEIGHT)
            + (self.recency * RECENCY_WEIGHT)
            + (self.keyword * KEYWORD_WEIGHT)
    }

    /// Final score.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.base() * self.boost
    }
}

/// Scores and ranks repositories for a search keyword.
///
/// # Example
///
/// ```rust
/// use repodigest::models::{Preferences, Repository};
/// use repodigest::services::Scorer;
///
/// let scorer = Scorer::new(Some(Preferences::new(["rag"], 2.0)));
/// let ranked = scorer.rank(
///     vec![
///         Repository::new("a/plain").with_stars(500),
///         Repository::new("b/rag-kit").with_stars(400),
///     ],
///     "rust",
/// );
/// assert_eq!(ranked[0].repository.name, "rag-kit");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    preferences: Option<Preferences>,
    reference_time: Option<DateTime<Utc>>,
}

impl Scorer {
    /// Creates a scorer with optional preferences.
    #[must_use]
    pub const fn new(preferences: Option<Preferences>) -> Self {
        Self {
            preferences,
            reference_time: None,
        }
    }

    /// Pins "now" for the recency signal instead of reading the clock.
    #[must_use]
    pub const fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn now(&self) -> DateTime<Utc> {
        self.reference_time.unwrap_or_else(Utc::now)
    }

    /// Computes each score component for a repository.
    #[must_use]
    pub fn breakdown(&self, repo: &Repository, keyword: &str) -> ScoreBreakdown {
        self.breakdown_at(repo, keyword, self.now())
    }

    #[allow(clippy::cast_precision_loss)]
    fn breakdown_at(&self, repo: &Repository, keyword: &str, now: DateTime<Utc>) -> ScoreBreakdown {
        ScoreBreakdown {
            stars: (repo.stars as f64 / STARS_CAP).min(1.0) * STARS_CAP,
            forks: (repo.forks as f64 / FORKS_CAP).min(1.0) * FORKS_CAP,
            recency: recency_score_at(&repo.updated_at, DEFAULT_RECENCY_DAYS, now) * SIGNAL_SCALE,
            keyword: keyword_match(repo, keyword) * SIGNAL_SCALE,
            boost: preference_boost(repo, self.preferences.as_ref()),
        }
    }

    /// Scores a single repository.
    #[must_use]
    pub fn score(&self, repo: &Repository, keyword: &str) -> f64 {
        self.breakdown(repo, keyword).total()
    }

    /// Scores every repository and sorts by descending score.
    ///
    /// The sort is stable: equal scores keep their input order.
    #[instrument(skip(self, repos), fields(repos = repos.len()))]
    pub fn rank(&self, repos: Vec<Repository>, keyword: &str) -> Vec<RankedRepository> {
        let now = self.now();
        let mut ranked: Vec<RankedRepository> = repos
            .into_iter()
            .map(|repository| {
                let breakdown = self.breakdown_at(&repository, keyword, now);
                let score = breakdown.total();
                debug!(
                    repo = %repository.name,
                    score,
                    stars = breakdown.stars,
                    forks = breakdown.forks,
                    recency = breakdown.recency,
                    keyword = breakdown.keyword,
                    boost = breakdown.boost,
                    "Scored repository"
                );
                RankedRepository { repository, score }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }
}

/// Scores a repository without a scorer instance.
#[must_use]
pub fn score_repo(repo: &Repository, keyword: &str, preferences: Option<&Preferences>) -> f64 {
    Scorer::new(preferences.cloned()).score(repo, keyword)
}

/// Ranks repositories without a scorer instance.
#[must_use]
pub fn rank_repos(
    repos: Vec<Repository>,
    keyword: &str,
    preferences: Option<&Preferences>,
) -> Vec<RankedRepository> {
    Scorer::new(preferences.cloned()).rank(repos, keyword)
}
