//! Wire-level error types.

use thiserror::Error;

/// Errors from decoding bus payloads.
///
/// These are expected operational outcomes, not fatal conditions: a consumer
/// that hits one records it and keeps processing the next message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The envelope JSON or its `encrypted_data` hex field could not be
    /// decoded. Distinct from an authentication failure, which only the
    /// codec can produce.
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// A plaintext payload could not be parsed as a sensor reading.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}
