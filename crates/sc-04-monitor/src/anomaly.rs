//! Anomaly comparison against recent legitimate data.
//!
//! Only invoked for events already classified as an attack; a missing
//! baseline is a skip, not an error.

use shared_types::SensorReading;

/// Default deviation threshold, in the reading's unit.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 50.0;

/// Result of comparing an attacked reading to the last normal one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyVerdict {
    /// Absolute deviation from the baseline.
    pub delta: f64,
    /// Whether the deviation exceeds the threshold.
    pub is_anomalous: bool,
}

/// Compares incoming readings against the most recent legitimate one.
#[derive(Debug, Clone, Copy)]
pub struct AnomalyComparator {
    threshold: f64,
}

impl AnomalyComparator {
    /// Create with a custom threshold.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// The configured threshold.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Compare a (possibly attacked) reading against the last normal one.
    #[must_use]
    pub fn compare(&self, current: &SensorReading, last_normal: &SensorReading) -> AnomalyVerdict {
        let delta = (current.distance - last_normal.distance).abs();
        AnomalyVerdict {
            delta,
            is_anomalous: delta > self.threshold,
        }
    }
}

impl Default for AnomalyComparator {
    fn default() -> Self {
        Self::new(DEFAULT_ANOMALY_THRESHOLD)
    }
}
