//! GitHub search API payloads.

use crate::models::{DEFAULT_DESCRIPTION, DEFAULT_LANGUAGE, RepoId, Repository};
use serde::Deserialize;

/// Response body of `GET /search/repositories`.
#[derive(Debug, Deserialize, Default)]
pub struct SearchResponse {
    /// Total matches reported by the API.
    #[serde(default)]
    pub total_count: u64,
    /// Matching repositories, best first.
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// One repository in a search response.
#[derive(Debug, Deserialize, Default)]
pub struct SearchItem {
    /// Short name.
    #[serde(default)]
    pub name: String,
    /// `owner/name`.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Description, often null.
    #[serde(default)]
    pub description: Option<String>,
    /// Browser URL.
    #[serde(default)]
    pub html_url: String,
    /// Star count.
    #[serde(default)]
    pub stargazers_count: u64,
    /// Fork count.
    #[serde(default)]
    pub forks_count: u64,
    /// Primary language, null when undetected.
    #[serde(default)]
    pub language: Option<String>,
    /// Last update, RFC 3339.
    #[serde(default)]
    pub updated_at: String,
    /// Topic tags.
    #[serde(default)]
    pub topics: Vec<String>,
}

impl From<SearchItem> for Repository {
    fn from(item: SearchItem) -> Self {
        Self {
            name: item.name,
            full_name: item.full_name.filter(|s| !s.is_empty()).map(RepoId::from),
            description: item
                .description
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            url: item.html_url,
            stars: item.stargazers_count,
            forks: item.forks_count,
            language: item
                .language
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            updated_at: item.updated_at,
            topics: item.topics,
        }
    }
}
