//! # Telemetry Publisher (sc-01)
//!
//! The honest sender in the telemetry channel testbed. Simulates a
//! distance sensor and publishes each reading twice on every tick: clear
//! JSON on the raw channel and an authenticated Ascon-128 envelope on the
//! encrypted channel. An outbound metrics-relay port forwards readings to
//! an external sink when one is configured.

pub mod relay;
pub mod sensor;
pub mod service;

pub use relay::{MetricsRelay, NoOpRelay, RelayError};
pub use sensor::{
    DistanceSensor, DEFAULT_BASE_DISTANCE, DEFAULT_DEVICE_ID, DEFAULT_JITTER,
};
pub use service::{PublisherActor, PublisherStats, DEFAULT_PUBLISH_INTERVAL};
