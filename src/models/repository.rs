//! Repository records and identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used when a repository has no description.
pub const DEFAULT_DESCRIPTION: &str = "No description provided";

/// Placeholder used when a repository has no detected language.
pub const DEFAULT_LANGUAGE: &str = "Unknown";

/// Stable identity of a repository in `owner/name` form.
///
/// This is the key of the seen-repo cache, so it must not change across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(String);

impl RepoId {
    /// Creates a new repository ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RepoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A candidate repository fetched from the search API.
///
/// Constructed fresh on every run and never written back to the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Short display name.
    #[serde(default)]
    pub name: String,
    /// Identity in `owner/name` form. Repositories without one cannot be
    /// deduplicated and are dropped by the seen-repo cache.
    #[serde(default)]
    pub full_name: Option<RepoId>,
    /// Short description.
    #[serde(default = "default_description")]
    pub description: String,
    /// Browser URL.
    #[serde(default)]
    pub url: String,
    /// Star count.
    #[serde(default)]
    pub stars: u64,
    /// Fork count.
    #[serde(default)]
    pub forks: u64,
    /// Primary language.
    #[serde(default = "default_language")]
    pub language: String,
    /// Last update timestamp, ISO-8601. Naive timestamps are read as UTC.
    #[serde(default)]
    pub updated_at: String,
    /// Topic tags. Order is irrelevant.
    #[serde(default)]
    pub topics: Vec<String>,
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for Repository {
    fn default() -> Self {
        Self {
            name: String::new(),
            full_name: None,
            description: default_description(),
            url: String::new(),
            stars: 0,
            forks: 0,
            language: default_language(),
            updated_at: String::new(),
            topics: Vec::new(),
        }
    }
}

impl Repository {
    /// Creates a repository with the given identity. The display name is
    /// taken from the part after the slash.
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let name = full_name
            .rsplit_once('/')
            .map_or_else(|| full_name.clone(), |(_, name)| name.to_string());
        Self {
            name,
            full_name: Some(RepoId::new(full_name)),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the star count.
    #[must_use]
    pub const fn with_stars(mut self, stars: u64) -> Self {
        self.stars = stars;
        self
    }

    /// Sets the fork count.
    #[must_use]
    pub const fn with_forks(mut self, forks: u64) -> Self {
        self.forks = forks;
        self
    }

    /// Sets the last update timestamp.
    #[must_use]
    pub fn with_updated_at(mut self, updated_at: impl Into<String>) -> Self {
        self.updated_at = updated_at.into();
        self
    }

    /// Sets the topic tags.
    #[must_use]
    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the identity, treating an empty string as absent.
    #[must_use]
    pub fn id(&self) -> Option<&RepoId> {
        self.full_name.as_ref().filter(|id| !id.as_str().is_empty())
    }
}

/// A repository with its derived ranking score attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRepository {
    /// The scored repository.
    pub repository: Repository,
    /// Composite relevance score.
    pub score: f64,
}

impl RankedRepository {
    /// Returns the repository identity, if any.
    #[must_use]
    pub fn id(&self) -> Option<&RepoId> {
        self.repository.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_name() {
        let repo = Repository::new("openai/whisper");
        assert_eq!(repo.name, "whisper");
        assert_eq!(repo.id().map(RepoId::as_str), Some("openai/whisper"));
        assert_eq!(repo.description, DEFAULT_DESCRIPTION);
        assert_eq!(repo.language, DEFAULT_LANGUAGE);
    }

    #[test]
    fn test_empty_identity_is_absent() {
        let mut repo = Repository::new("a/b");
        repo.full_name = Some(RepoId::new(""));
        assert!(repo.id().is_none());

        repo.full_name = None;
        assert!(repo.id().is_none());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let repo: Repository = serde_json::from_str(r#"{"name": "x", "full_name": "o/x"}"#).unwrap();
        assert_eq!(repo.description, DEFAULT_DESCRIPTION);
        assert_eq!(repo.language, DEFAULT_LANGUAGE);
        assert_eq!(repo.stars, 0);
        assert!(repo.topics.is_empty());
    }
}
