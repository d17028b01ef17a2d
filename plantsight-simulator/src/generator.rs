//! Synthetic reading generation.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use plantsight_common::Reading;

/// Generates one synthetic reading per call from a fixed machine pool.
///
/// Machine ids follow the pattern `M100`, `M101`, ... Values are drawn
/// uniformly from the simulated domains and rounded the way a real
/// sensor gateway would quantize them. Pure apart from its RNG.
pub struct ReadingGenerator {
    rng: SmallRng,
    machine_ids: Vec<String>,
}

impl ReadingGenerator {
    /// Create a generator with an OS-seeded RNG.
    pub fn new(machine_count: usize) -> Self {
        Self::with_rng(machine_count, SmallRng::from_os_rng())
    }

    /// Create a generator with an explicit RNG (deterministic in tests).
    pub fn with_rng(machine_count: usize, rng: SmallRng) -> Self {
        let machine_ids = (0..machine_count).map(|i| format!("M{}", 100 + i)).collect();
        Self { rng, machine_ids }
    }

    /// The fixed pool of machine identifiers.
    pub fn machine_ids(&self) -> &[String] {
        &self.machine_ids
    }

    /// Produce the next reading, timestamped now.
    pub fn next_reading(&mut self) -> Reading {
        let idx = self.rng.random_range(0..self.machine_ids.len());
        let machine_id = self.machine_ids[idx].clone();

        let temperature = round_to(self.rng.random_range(60.0..=100.0), 1);
        let vibration = round_to(self.rng.random_range(0.5..=5.0), 2);
        let rpm = self.rng.random_range(1000..=2000);

        Reading::new(machine_id, temperature, vibration, rpm)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
