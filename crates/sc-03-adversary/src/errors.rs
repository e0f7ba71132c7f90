//! Adversary error types.

use shared_types::WireError;
use std::time::Duration;
use thiserror::Error;

/// Errors from adversary operations.
#[derive(Debug, Error)]
pub enum AdversaryError {
    /// No message matching the capture predicate arrived in time.
    #[error("No matching message captured within {timeout:?}")]
    CaptureTimeout { timeout: Duration },

    /// A captured payload could not be parsed.
    #[error("Captured payload could not be parsed: {0}")]
    Wire(#[from] WireError),

    /// A republished message reached no subscribers.
    #[error("Republished message on {label} reached no subscribers")]
    NoSubscribers { label: String },

    /// Flipped ciphertext still decrypted under the correct key.
    #[error("Tamper verification failed: flipped ciphertext still decrypts")]
    TamperNotDetected,
}
