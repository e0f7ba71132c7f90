//! Outbound metrics relay port.
//!
//! The original deployment forwarded every reading to a cloud dashboard
//! alongside the bus publish. The testbed keeps the port so that wiring
//! stays realistic, with a no-op implementation as the default.

use async_trait::async_trait;
use shared_types::SensorReading;
use thiserror::Error;

/// Errors from relaying a reading to an external sink.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The sink rejected or never acknowledged the reading.
    #[error("Relay rejected reading: {0}")]
    Rejected(String),
}

/// Port for forwarding readings to an external metrics sink.
///
/// Relay failures are reported but never block channel publishing.
#[async_trait]
pub trait MetricsRelay: Send + Sync {
    /// Forward one reading.
    async fn relay(&self, reading: &SensorReading) -> Result<(), RelayError>;
}

/// Discards every reading. The default when no sink is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRelay;

#[async_trait]
impl MetricsRelay for NoOpRelay {
    async fn relay(&self, _reading: &SensorReading) -> Result<(), RelayError> {
        Ok(())
    }
}
