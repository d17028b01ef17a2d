//! Well-known key expressions for the PlantSight pipeline.

/// Prefix for all PlantSight key expressions.
pub const KEY_PREFIX: &str = "plantsight";

/// The single well-known key expression carrying machine readings.
///
/// Every publisher puts JSON-encoded readings here; every store writer
/// subscribes here independently.
pub const READINGS_KEY: &str = "plantsight/readings";
