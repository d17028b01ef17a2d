//! Configuration for the simulator.

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

/// Complete simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Zenoh connection settings.
    #[serde(default)]
    pub zenoh: ZenohConfig,

    /// Simulation settings.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the reading generator and tick loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of machines in the fixed pool (default: 11).
    #[serde(default = "default_machine_count")]
    pub machine_count: usize,

    /// Tick interval in milliseconds (default: 10000).
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Key expression readings are published on.
    #[serde(default = "default_key")]
    pub key: String,

    /// WebSocket URL of the snapshot relay.
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Snapshot canvas settings.
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

fn default_machine_count() -> usize {
    11
}

fn default_tick_interval() -> u64 {
    10_000
}

fn default_key() -> String {
    READINGS_KEY.to_string()
}

fn default_relay_url() -> String {
    "ws://127.0.0.1:8765".to_string()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            machine_count: default_machine_count(),
            tick_interval_ms: default_tick_interval(),
            key: default_key(),
            relay_url: default_relay_url(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

/// Snapshot canvas dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Canvas width in pixels (default: 300).
    #[serde(default = "default_width")]
    pub width: usize,

    /// Canvas height in pixels (default: 200).
    #[serde(default = "default_height")]
    pub height: usize,
}

fn default_width() -> usize {
    300
}

fn default_height() -> usize {
    200
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from a JSON5 file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: SimulatorConfig = json5::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.machine_count == 0 {
            return Err(ConfigError::Validation(
                "machine_count must be > 0".to_string(),
            ));
        }

        if self.simulation.tick_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "tick_interval_ms must be > 0".to_string(),
            ));
        }

        if self.simulation.key.is_empty() {
            return Err(ConfigError::Validation("key must not be empty".to_string()));
        }

        if !self.simulation.relay_url.starts_with("ws://")
            && !self.simulation.relay_url.starts_with("wss://")
        {
            return Err(ConfigError::Validation(format!(
                "relay_url must be a ws:// or wss:// URL, got '{}'",
                self.simulation.relay_url
            )));
        }

        if self.simulation.snapshot.width == 0 || self.simulation.snapshot.height == 0 {
            return Err(ConfigError::Validation(
                "snapshot dimensions must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            zenoh: ZenohConfig::default(),
            simulation: SimulationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = SimulatorConfig::parse("{}").unwrap();

        assert_eq!(config.simulation.machine_count, 11);
        assert_eq!(config.simulation.tick_interval_ms, 10_000);
        assert_eq!(config.simulation.key, "plantsight/readings");
        assert_eq!(config.simulation.relay_url, "ws://127.0.0.1:8765");
        assert_eq!(config.simulation.snapshot.width, 300);
        assert_eq!(config.simulation.snapshot.height, 200);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            zenoh: {
                mode: "client",
                connect: ["tcp/localhost:7447"]
            },
            simulation: {
                machine_count: 4,
                tick_interval_ms: 500,
                relay_url: "ws://relay.local:9000",
                snapshot: { width: 320, height: 240 }
            },
            logging: { level: "debug" }
        }"#;

        let config = SimulatorConfig::parse(json).unwrap();

        assert_eq!(config.zenoh.mode, "client");
        assert_eq!(config.simulation.machine_count, 4);
        assert_eq!(config.simulation.tick_interval_ms, 500);
        assert_eq!(config.simulation.relay_url, "ws://relay.local:9000");
        assert_eq!(config.simulation.snapshot.width, 320);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_zero_machines() {
        let result = SimulatorConfig::parse(r#"{ simulation: { machine_count: 0 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_zero_interval() {
        let result = SimulatorConfig::parse(r#"{ simulation: { tick_interval_ms: 0 } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_bad_relay_url() {
        let result = SimulatorConfig::parse(r#"{ simulation: { relay_url: "http://nope" } }"#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("relay_url"));
    }
}
