//! PlantSight Common Library
//!
//! Shared types and utilities for the PlantSight telemetry pipeline:
//!
//! - [`reading`] - The sensor reading data model
//! - [`wire`] - JSON wire encoding and decoding
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`session`] - Zenoh session management
//! - [`topic`] - Well-known key expressions
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod reading;
pub mod session;
pub mod topic;
pub mod wire;

// Re-export commonly used types at the crate root
pub use config::{LogFormat, LoggingConfig, ZenohConfig, load_config, parse_config};
pub use error::{Error, Result};
pub use reading::Reading;
pub use session::connect;
pub use topic::READINGS_KEY;
pub use wire::{ECHO_REPLY_PREFIX, IMAGE_FRAME_PREFIX, decode_reading, encode_reading};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// The `RUST_LOG` environment variable takes precedence over the configured
/// level when set.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
