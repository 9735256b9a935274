//! Cache CLI command.

use crate::config::DigestConfig;
use crate::services::SeenRepoCache;
use crate::{Error, Result};

/// Cache maintenance actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheCommand {
    /// Print every entry as JSON.
    Show,
    /// Drop entries outside the configured window.
    Sweep,
    /// Drop every entry.
    Clear,
}

impl CacheCommand {
    /// Executes the action and returns the text to print.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be serialized or written.
    pub fn execute(self, config: &DigestConfig) -> Result<String> {
        let cache = SeenRepoCache::new(&config.cache_path);
        match self {
            Self::Show => serde_json::to_string_pretty(&cache.load())
                .map_err(|e| Error::operation("serialize_cache", e)),
            Self::Sweep => {
                let result = cache.sweep(config.cache_days)?;
                Ok(format!(
                    "Removed {} entries older than {} days, {} retained",
                    result.removed, config.cache_days, result.retained
                ))
            },
            Self::Clear => {
                let removed = cache.clear()?;
                Ok(format!("Cleared {removed} entries"))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> DigestConfig {
        let mut config = DigestConfig::default();
        config.cache_path = dir.path().join("seen_repos.json");
        config
    }

    #[test]
    fn test_show_empty() {
        let dir = TempDir::new().unwrap();
        assert_eq!(CacheCommand::Show.execute(&config_in(&dir)).unwrap(), "{}");
    }

    #[test]
    fn test_sweep_and_clear() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir);
        let today = crate::today().format(crate::DATE_FORMAT).to_string();
        fs::write(
            &config.cache_path,
            format!(r#"{{"old/repo": "2000-01-01", "new/repo": "{today}"}}"#),
        )
        .unwrap();

        assert_eq!(
            CacheCommand::Sweep.execute(&config).unwrap(),
            "Removed 1 entries older than 7 days, 1 retained"
        );
        assert_eq!(CacheCommand::Clear.execute(&config).unwrap(), "Cleared 1 entries");
        assert_eq!(CacheCommand::Show.execute(&config).unwrap(), "{}");
    }
}
