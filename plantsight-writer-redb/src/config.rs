//! Configuration for the primary store writer.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use plantsight_common::config::{LoggingConfig, ZenohConfig};
use plantsight_common::topic::READINGS_KEY;

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

/// Complete writer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the document store and subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the database file.
    #[serde(default = "default_path")]
    pub path: String,

    /// Key expression to subscribe to.
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_path() -> String {
    "plantsight-alerts.redb".to_string()
}

fn default_key() -> String {
    READINGS_KEY.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            key: default_key(),
        }
    }
}

impl WriterConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: WriterConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.path.is_empty() {
            return Err(ConfigError::Validation(
                "store path must not be empty".to_string(),
            ));
        }

        if self.store.key.is_empty() {
            return Err(ConfigError::Validation("key must not be empty".to_string()));
        }

        Ok(())
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            zenoh: ZenohConfig::default(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
