//! Simulated distance sensor.

use rand::Rng;
use shared_types::SensorReading;

/// Default device identifier, matching the hardware the simulation
/// stands in for.
pub const DEFAULT_DEVICE_ID: &str = "ESP8266_HCSR04";

/// Default baseline distance in centimeters.
pub const DEFAULT_BASE_DISTANCE: f64 = 25.0;

/// Default jitter half-range in centimeters.
pub const DEFAULT_JITTER: f64 = 5.0;

/// Produces plausible distance readings around a baseline.
///
/// Each call draws uniform jitter in `[-jitter, +jitter]` and stamps a
/// monotonically increasing per-device count.
pub struct DistanceSensor {
    device_id: String,
    base_distance: f64,
    jitter: f64,
    count: u64,
}

impl DistanceSensor {
    /// Sensor with the default baseline and jitter.
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        Self::with_profile(device_id, DEFAULT_BASE_DISTANCE, DEFAULT_JITTER)
    }

    /// Sensor with a custom baseline and jitter half-range.
    #[must_use]
    pub fn with_profile(device_id: impl Into<String>, base_distance: f64, jitter: f64) -> Self {
        Self {
            device_id: device_id.into(),
            base_distance,
            jitter,
            count: 0,
        }
    }

    /// Take the next reading.
    pub fn read(&mut self) -> SensorReading {
        self.count += 1;
        let noise = if self.jitter > 0.0 {
            rand::thread_rng().gen_range(-self.jitter..=self.jitter)
        } else {
            0.0
        };
        let distance = ((self.base_distance + noise) * 100.0).round() / 100.0;
        SensorReading::new(self.device_id.clone(), self.count, distance)
    }

    /// Readings taken so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }
}
