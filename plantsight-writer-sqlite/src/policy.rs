//! Alert policy for the secondary store.
//!
//! The two store writers deliberately apply different predicates to the
//! same stream; this one flags machines running hot or vibrating hard.
//! Do not unify it with the primary writer's rule.

use plantsight_common::Reading;

/// Temperatures above this are alerts.
pub const TEMP_LIMIT: f64 = 80.0;

/// Vibration levels above this are alerts.
pub const VIBRATION_LIMIT: f64 = 3.0;

/// True if the reading should be persisted as an alert.
pub fn qualifies(reading: &Reading) -> bool {
    reading.temperature > TEMP_LIMIT || reading.vibration > VIBRATION_LIMIT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f64, vibration: f64) -> Reading {
        Reading::new("M100", temperature, vibration, 1500)
    }

    #[test]
    fn test_hot_machine_qualifies() {
        assert!(qualifies(&reading(85.0, 1.0)));
    }

    #[test]
    fn test_vibrating_machine_qualifies() {
        assert!(qualifies(&reading(75.0, 3.5)));
    }

    #[test]
    fn test_limits_are_exclusive() {
        assert!(!qualifies(&reading(80.0, 3.0)));
    }

    #[test]
    fn test_cool_reading_is_ignored_here() {
        // Below the normal band is the primary writer's concern.
        assert!(!qualifies(&reading(65.0, 1.0)));
    }
}
