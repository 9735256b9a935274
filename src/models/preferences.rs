//! User ranking preferences.

use serde::{Deserialize, Serialize};

/// Boost applied when preferences are configured without an explicit multiplier.
pub const DEFAULT_BOOST_MULTIPLIER: f64 = 1.5;

/// Preferred keywords and the multiplier applied to matching repositories.
///
/// Keyword order does not affect the boost; only whether any keyword matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Keywords the user wants ranked higher.
    pub preferred_topics: Vec<String>,
    /// Multiplier applied to the base score on a match.
    pub topic_boost_multiplier: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            preferred_topics: vec!["rag".to_string(), "llm".to_string(), "transformers".to_string()],
            topic_boost_multiplier: DEFAULT_BOOST_MULTIPLIER,
        }
    }
}

impl Preferences {
    /// Creates preferences from keywords and a multiplier.
    #[must_use]
    pub fn new<I, S>(topics: I, multiplier: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred_topics: topics.into_iter().map(Into::into).collect(),
            topic_boost_multiplier: multiplier,
        }
    }
}
