//! Config CLI command.

use crate::config::DigestConfig;
use crate::{Error, Result};

/// Config command handler.
pub struct ConfigCommand;

impl ConfigCommand {
    /// Renders the effective configuration as JSON.
    ///
    /// The token is never printed; only whether one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn show(config: &DigestConfig) -> Result<String> {
        let mut value = serde_json::to_value(config.to_config_file())
            .map_err(|e| Error::operation("serialize_config", e))?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "github_token".to_string(),
                serde_json::Value::from(if config.github_token.is_some() {
                    "(set)"
                } else {
                    "(unset)"
                }),
            );
        }
        serde_json::to_string_pretty(&value).map_err(|e| Error::operation("serialize_config", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_show_hides_token() {
        let mut config = DigestConfig::default();
        config.github_token = Some(SecretString::from("ghp_secret"));

        let shown = ConfigCommand::show(&config).unwrap();

        assert!(!shown.contains("ghp_secret"));
        assert!(shown.contains("\"github_token\": \"(set)\""));
        assert!(shown.contains("\"cache_days\": 7"));
    }
}
