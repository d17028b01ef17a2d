//! Error types for the simulator.

use thiserror::Error;

/// Result type alias using [`SimulatorError`].
pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Errors that can occur while publishing.
///
/// None of these are fatal to the tick loop; they are logged and the
/// next tick proceeds.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// Snapshot relay connection or send failure.
    #[error("Relay error: {0}")]
    Relay(#[from] tokio_tungstenite::tungstenite::Error),
}
