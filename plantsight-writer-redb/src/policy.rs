//! Alert policy for the primary store.
//!
//! The two store writers deliberately apply different predicates to the
//! same stream; this one flags temperatures outside the normal
//! operating band. Do not unify it with the secondary writer's rule.

use plantsight_common::Reading;

/// Lower bound of the normal temperature band.
pub const TEMP_LOW: f64 = 70.0;

/// Upper bound of the normal temperature band.
pub const TEMP_HIGH: f64 = 90.0;

/// True if the reading should be persisted as an alert.
pub fn qualifies(reading: &Reading) -> bool {
    reading.temperature < TEMP_LOW || reading.temperature > TEMP_HIGH
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f64, vibration: f64) -> Reading {
        Reading::new("M100", temperature, vibration, 1500)
    }

    #[test]
    fn test_out_of_band_temperatures_qualify() {
        assert!(qualifies(&reading(95.0, 1.0)));
        assert!(qualifies(&reading(65.0, 1.0)));
    }

    #[test]
    fn test_band_is_inclusive() {
        assert!(!qualifies(&reading(70.0, 1.0)));
        assert!(!qualifies(&reading(90.0, 1.0)));
        assert!(!qualifies(&reading(80.0, 1.0)));
    }

    #[test]
    fn test_vibration_is_ignored_here() {
        // High vibration alone is the secondary writer's concern.
        assert!(!qualifies(&reading(75.0, 3.5)));
    }
}
