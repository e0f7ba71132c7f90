//! # Telemetry Subscriber (sc-02)
//!
//! The honest receiver in the telemetry channel testbed. Listens on the
//! encrypted channel only, opens each envelope with the shared key, and
//! recovers the sensor reading. Anything that fails authentication is
//! counted and dropped; a failed open never stops the session.

pub mod service;

pub use service::{DecryptOutcome, SubscriberActor, SubscriberStats};
