use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single sensor reading emitted by a simulated machine.
///
/// A reading is fully self-describing: it carries no reference to prior
/// readings and no identity beyond its fields. Stores assign their own
/// keys when they persist one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Machine identifier from the fixed pool (e.g. "M104").
    pub machine_id: String,

    /// When the measurement was taken. ISO-8601 on the wire.
    pub timestamp: DateTime<Utc>,

    /// Degrees Celsius. Simulated in [60.0, 100.0], unbounded in the type.
    pub temperature: f64,

    /// Vibration amplitude. Simulated in [0.5, 5.0].
    pub vibration: f64,

    /// Rotations per minute. Simulated in [1000, 2000].
    pub rpm: u32,
}

impl Reading {
    /// Create a reading timestamped now.
    pub fn new(machine_id: impl Into<String>, temperature: f64, vibration: f64, rpm: u32) -> Self {
        Self {
            machine_id: machine_id.into(),
            timestamp: Utc::now(),
            temperature,
            vibration,
            rpm,
        }
    }

    /// Replace the timestamp (used by the generator and by tests).
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Fixed-width UTC timestamp suitable for lexicographic ordering
    /// (document-store keys sort by this).
    pub fn timestamp_key(&self) -> String {
        self.timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} temp={:.1} vib={:.2} rpm={}",
            self.machine_id, self.temperature, self.vibration, self.rpm
        )
    }
}
