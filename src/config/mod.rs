//! Configuration management.
//!
//! Settings come from a JSON (default) or TOML file whose keys are all
//! optional, then environment overrides are applied on top:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `REPODIGEST_CACHE_DAYS` | `cache_days` |
//! | `REPODIGEST_CACHE_PATH` | `cache_path` |
//! | `REPODIGEST_REPORT_DIR` | `report_dir` |
//! | `REPODIGEST_FETCH_TIMEOUT_MS` | `fetch_timeout_ms` |
//! | `REPODIGEST_GITHUB_TOKEN` | `github_token` |

use crate::github::GitHubConfig;
use crate::models::Preferences;
use crate::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "REPODIGEST_CONFIG_PATH";

/// Config file name used in the platform and working directories.
pub const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_CACHE_DAYS: u32 = 7;
const DEFAULT_CACHE_PATH: &str = "cache/seen_repos.json";
const DEFAULT_REPORT_DIR: &str = "daily";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Effective digest configuration.
#[derive(Debug, Clone)]
pub struct DigestConfig {
    /// Keywords that earn a ranking boost.
    pub preferred_topics: Vec<String>,
    /// Multiplier applied to boosted repositories.
    pub topic_boost_multiplier: f64,
    /// Deduplication window in days.
    pub cache_days: u32,
    /// Seen-repo cache file.
    pub cache_path: PathBuf,
    /// Directory reports are written to.
    pub report_dir: PathBuf,
    /// GitHub request timeout.
    pub fetch_timeout_ms: u64,
    /// GitHub API token.
    pub github_token: Option<SecretString>,
}

/// On-disk configuration; every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Preferred keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_topics: Option<Vec<String>>,
    /// Boost multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_boost_multiplier: Option<f64>,
    /// Deduplication window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_days: Option<u32>,
    /// Cache file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<String>,
    /// Report directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<String>,
    /// Request timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_timeout_ms: Option<u64>,
    /// API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        let preferences = Preferences::default();
        Self {
            preferred_topics: preferences.preferred_topics,
            topic_boost_multiplier: preferences.topic_boost_multiplier,
            cache_days: DEFAULT_CACHE_DAYS,
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            github_token: None,
        }
    }
}

impl DigestConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// Files ending in `.toml` are parsed as TOML, everything else as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::operation("read_config_file", format!("{}: {e}", path.display())))?;

        let file: ConfigFile = if is_toml(path) {
            toml::from_str(&contents).map_err(|e| Error::operation("parse_config_file", e))?
        } else {
            serde_json::from_str(&contents).map_err(|e| Error::operation("parse_config_file", e))?
        };

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from `path`, writing defaults there first if the
    /// file does not exist.
    ///
    /// A file that cannot be read or parsed yields defaults; the failure is
    /// logged. Failing to write the bootstrap file is logged as well.
    #[must_use]
    pub fn load_or_init(path: &Path) -> Self {
        if !path.exists() {
            let config = Self::default();
            match config.save_to_file(path) {
                Ok(()) => info!(path = %path.display(), "Wrote default configuration"),
                Err(e) => warn!(error = %e, "Failed to write default configuration"),
            }
            return config;
        }

        match Self::load_from_file(path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded configuration");
                config
            },
            Err(e) => {
                warn!(error = %e, "Configuration unreadable, using defaults");
                Self::default()
            },
        }
    }

    /// Resolves the config path and loads it with environment overrides.
    ///
    /// See [`resolve_path`](Self::resolve_path).
    #[must_use]
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = Self::resolve_path(explicit, |key| std::env::var(key).ok());
        Self::load_or_init(&path).with_env_overrides()
    }

    /// Picks the config file to use.
    ///
    /// Checks, in order:
    /// 1. `explicit` (the `--config` flag)
    /// 2. `REPODIGEST_CONFIG_PATH`
    /// 3. `<platform config dir>/repodigest/config.json`, if it exists
    /// 4. `./config.json`
    #[must_use]
    pub fn resolve_path<F>(explicit: Option<&Path>, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Some(path) = lookup(CONFIG_PATH_ENV).filter(|value| !value.trim().is_empty()) {
            return PathBuf::from(path);
        }
        if let Some(base_dirs) = directories::BaseDirs::new() {
            let platform_config = base_dirs
                .config_dir()
                .join("repodigest")
                .join(CONFIG_FILE_NAME);
            if platform_config.exists() {
                return platform_config;
            }
        }
        PathBuf::from(CONFIG_FILE_NAME)
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_env_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary variable lookup.
    ///
    /// Values that fail to parse are ignored.
    #[must_use]
    pub fn with_env_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(days) = lookup("REPODIGEST_CACHE_DAYS").and_then(|v| v.trim().parse().ok()) {
            self.cache_days = days;
        }
        if let Some(path) = lookup("REPODIGEST_CACHE_PATH").filter(|v| !v.is_empty()) {
            self.cache_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("REPODIGEST_REPORT_DIR").filter(|v| !v.is_empty()) {
            self.report_dir = PathBuf::from(dir);
        }
        if let Some(ms) = lookup("REPODIGEST_FETCH_TIMEOUT_MS").and_then(|v| v.trim().parse().ok())
        {
            self.fetch_timeout_ms = ms;
        }
        if let Some(token) = lookup("REPODIGEST_GITHUB_TOKEN").filter(|v| !v.is_empty()) {
            self.github_token = Some(SecretString::from(token));
        }
        self
    }

    /// Writes the configuration, without the token, to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = self.to_config_file();
        let data = if is_toml(path) {
            toml::to_string_pretty(&file).map_err(|e| Error::operation("serialize_config", e))?
        } else {
            serde_json::to_string_pretty(&file)
                .map_err(|e| Error::operation("serialize_config", e))?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::operation("create_config_dir", format!("{}: {e}", parent.display()))
            })?;
        }
        fs::write(path, data)
            .map_err(|e| Error::operation("write_config_file", format!("{}: {e}", path.display())))
    }

    /// Returns a serializable copy with the token omitted.
    #[must_use]
    pub fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            preferred_topics: Some(self.preferred_topics.clone()),
            topic_boost_multiplier: Some(self.topic_boost_multiplier),
            cache_days: Some(self.cache_days),
            cache_path: Some(self.cache_path.display().to_string()),
            report_dir: Some(self.report_dir.display().to_string()),
            fetch_timeout_ms: Some(self.fetch_timeout_ms),
            github_token: None,
        }
    }

    /// Returns the ranking preferences.
    #[must_use]
    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.preferred_topics.clone(), self.topic_boost_multiplier)
    }

    /// Returns GitHub client settings.
    #[must_use]
    pub fn github_config(&self) -> GitHubConfig {
        let config = GitHubConfig::default().with_timeout_ms(self.fetch_timeout_ms);
        match &self.github_token {
            Some(token) => config.with_token(token.clone()),
            None => config,
        }
    }

    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(topics) = file.preferred_topics {
            config.preferred_topics = topics;
        }
        if let Some(multiplier) = file.topic_boost_multiplier {
            config.topic_boost_multiplier = multiplier;
        }
        if let Some(days) = file.cache_days {
            config.cache_days = days;
        }
        if let Some(path) = file.cache_path {
            config.cache_path = PathBuf::from(path);
        }
        if let Some(dir) = file.report_dir {
            config.report_dir = PathBuf::from(dir);
        }
        if let Some(ms) = file.fetch_timeout_ms {
            config.fetch_timeout_ms = ms;
        }
        config.github_token = file.github_token.map(SecretString::from);

        config
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_BOOST_MULTIPLIER;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DigestConfig::default();
        assert_eq!(config.preferred_topics, vec!["rag", "llm", "transformers"]);
        assert!((config.topic_boost_multiplier - DEFAULT_BOOST_MULTIPLIER).abs() < f64::EPSILON);
        assert_eq!(config.cache_days, 7);
        assert_eq!(config.cache_path, PathBuf::from("cache/seen_repos.json"));
        assert_eq!(config.report_dir, PathBuf::from("daily"));
        assert_eq!(config.fetch_timeout_ms, 10_000);
        assert!(config.github_token.is_none());
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"cache_days": 3, "preferred_topics": ["rust"]}"#).unwrap();

        let config = DigestConfig::load_from_file(&path).unwrap();

        assert_eq!(config.cache_days, 3);
        assert_eq!(config.preferred_topics, vec!["rust"]);
        assert!((config.topic_boost_multiplier - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.report_dir, PathBuf::from("daily"));
    }

    #[test]
    fn test_bootstrap_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = DigestConfig::load_or_init(&path);

        assert_eq!(config.cache_days, 7);
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["cache_days"], 7);
        assert_eq!(written["topic_boost_multiplier"], 1.5);
        assert!(written.get("github_token").is_none());
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(DigestConfig::load_from_file(&path).is_err());
        let config = DigestConfig::load_or_init(&path);
        assert_eq!(config.cache_days, 7);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ nope");
    }

    #[test]
    fn test_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "preferred_topics = [\"agents\"]\ntopic_boost_multiplier = 2.0\ncache_days = 14\n",
        )
        .unwrap();

        let config = DigestConfig::load_from_file(&path).unwrap();

        assert_eq!(config.preferred_topics, vec!["agents"]);
        assert!((config.topic_boost_multiplier - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.cache_days, 14);
    }

    #[test]
    fn test_save_roundtrip_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = DigestConfig::default();
        config.cache_days = 30;

        config.save_to_file(&path).unwrap();

        assert_eq!(DigestConfig::load_from_file(&path).unwrap().cache_days, 30);
    }

    #[test]
    fn test_env_overrides() {
        let config = DigestConfig::default().with_env_overrides_from(lookup(&[
            ("REPODIGEST_CACHE_DAYS", "2"),
            ("REPODIGEST_CACHE_PATH", "/tmp/seen.json"),
            ("REPODIGEST_REPORT_DIR", "/tmp/reports"),
            ("REPODIGEST_FETCH_TIMEOUT_MS", "2500"),
            ("REPODIGEST_GITHUB_TOKEN", "ghp_test"),
        ]));

        assert_eq!(config.cache_days, 2);
        assert_eq!(config.cache_path, PathBuf::from("/tmp/seen.json"));
        assert_eq!(config.report_dir, PathBuf::from("/tmp/reports"));
        assert_eq!(config.fetch_timeout_ms, 2500);
        assert_eq!(
            config.github_token.as_ref().map(|t| t.expose_secret()),
            Some("ghp_test")
        );
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let config = DigestConfig::default()
            .with_env_overrides_from(lookup(&[("REPODIGEST_CACHE_DAYS", "soon")]));
        assert_eq!(config.cache_days, 7);
    }

    #[test]
    fn test_resolve_path_precedence() {
        let explicit = PathBuf::from("/etc/repodigest.json");
        let env = lookup(&[(CONFIG_PATH_ENV, "/srv/config.toml")]);

        assert_eq!(
            DigestConfig::resolve_path(Some(&explicit), &env),
            explicit
        );
        assert_eq!(
            DigestConfig::resolve_path(None, &env),
            PathBuf::from("/srv/config.toml")
        );
    }

    #[test]
    fn test_preferences_and_github_config() {
        let config = DigestConfig::default().with_env_overrides_from(lookup(&[
            ("REPODIGEST_FETCH_TIMEOUT_MS", "1234"),
        ]));

        assert_eq!(config.preferences(), Preferences::default());
        assert_eq!(config.github_config().timeout_ms, 1234);
    }
}
