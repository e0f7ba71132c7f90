//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
///
/// `AuthenticationFailure` is an expected, first-class outcome: it is what
/// the whole testbed exists to demonstrate. Callers match on it; it is
/// never collapsed into a generic error string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The authentication tag did not verify. Raised for a wrong key, wrong
    /// nonce, mismatched associated data, any flipped bit, or a ciphertext
    /// too short to carry a tag.
    #[error("Authentication failure: tag verification failed")]
    AuthenticationFailure,

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid nonce length
    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected nonce length in bytes
        expected: usize,
        /// Actual nonce length in bytes
        actual: usize,
    },
}
