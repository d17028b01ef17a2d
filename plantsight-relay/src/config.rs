//! Configuration for the relay.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use plantsight_common::config::LoggingConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Complete relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address to listen on (default: "127.0.0.1:8765").
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_listen() -> String {
    "127.0.0.1:8765".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            logging: LoggingConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: RelayConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid listen address: {}",
                self.listen
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = RelayConfig::parse("{}").unwrap();
        assert_eq!(config.listen, "127.0.0.1:8765");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_custom_listen() {
        let config = RelayConfig::parse(r#"{ listen: "0.0.0.0:9100" }"#).unwrap();
        assert_eq!(config.listen, "0.0.0.0:9100");
    }

    #[test]
    fn test_validate_invalid_listen() {
        let result = RelayConfig::parse(r#"{ listen: "not-an-address" }"#);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid listen address")
        );
    }
}
