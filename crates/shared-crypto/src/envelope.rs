//! # Envelope Codec
//!
//! Wraps a plaintext record into an authenticated ciphertext envelope and
//! reverses the operation, surfacing authentication failure as a distinct
//! outcome.
//!
//! ## Security Properties
//!
//! - **Ascon-128**: 128-bit key, 128-bit nonce, 128-bit tag appended to the
//!   ciphertext (AEAD convention), lightweight permutation design.
//! - Any modification of ciphertext, tag, or associated data is rejected at
//!   `open` with [`CryptoError::AuthenticationFailure`].
//!
//! ## Caller Obligations
//!
//! The codec is deterministic: identical inputs produce identical output,
//! and the nonce is supplied by the caller. Nonce uniqueness across
//! semantically distinct secrets is a caller obligation; the codec does
//! not enforce it, and the testbed deliberately reuses one demo nonce to
//! mirror the system under study. Freshness (replay) is likewise out of
//! contract: `open` authenticates the bytes it is given, not their novelty.

use crate::CryptoError;
use ascon_aead::aead::{Aead, KeyInit, Payload};
use ascon_aead::{Ascon128, Key, Nonce};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use zeroize::Zeroize;

/// Key length in bytes.
pub const KEY_LEN: usize = 16;
/// Nonce length in bytes.
pub const NONCE_LEN: usize = 16;
/// Authentication tag length in bytes, appended to the ciphertext.
pub const TAG_LEN: usize = 16;
/// Algorithm identifier written into envelopes.
pub const ALGORITHM: &str = "Ascon-128";

/// Secret key (128-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking length.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` for any length other than 16.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; KEY_LEN] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: KEY_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

// Key bytes never reach logs or panic messages.
impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Nonce for sealing (128-bit), supplied by the caller.
#[derive(Clone)]
pub struct EnvelopeNonce([u8; NONCE_LEN]);

impl EnvelopeNonce {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking length.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidNonceLength` for any length other than 16.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; NONCE_LEN] =
            bytes
                .try_into()
                .map_err(|_| CryptoError::InvalidNonceLength {
                    expected: NONCE_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(arr))
    }

    /// Generate a random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for EnvelopeNonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EnvelopeNonce(..)")
    }
}

/// An authenticated ciphertext envelope with sealing metadata.
///
/// Owned by the codec at creation; read-only downstream.
#[derive(Debug, Clone)]
pub struct SealedEnvelope {
    /// Ciphertext with the 16-byte authentication tag appended.
    pub ciphertext: Vec<u8>,
    /// AEAD algorithm identifier.
    pub algorithm: &'static str,
    /// When the envelope was sealed.
    pub created_at: DateTime<Utc>,
    /// How long sealing took.
    pub encryption_duration: Duration,
    /// Plaintext size in bytes.
    pub plaintext_size: usize,
    /// Ciphertext size in bytes; always `plaintext_size + TAG_LEN`.
    pub ciphertext_size: usize,
}

impl SealedEnvelope {
    /// Sealing duration in milliseconds, for instrumentation.
    #[must_use]
    pub fn encryption_time_ms(&self) -> f64 {
        self.encryption_duration.as_secs_f64() * 1000.0
    }
}

/// Seal a plaintext into an authenticated envelope.
///
/// Deterministic given identical inputs; no internal randomness. Empty
/// plaintext is valid and produces a tag-only ciphertext of [`TAG_LEN`]
/// bytes.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if the primitive fails.
pub fn seal(
    plaintext: &[u8],
    key: &SecretKey,
    nonce: &EnvelopeNonce,
    associated_data: &[u8],
) -> Result<SealedEnvelope, CryptoError> {
    let cipher = Ascon128::new(Key::<Ascon128>::from_slice(key.as_bytes()));

    let started = Instant::now();
    let ciphertext = cipher
        .encrypt(
            Nonce::<Ascon128>::from_slice(nonce.as_bytes()),
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|_| CryptoError::EncryptionFailed("AEAD seal failed".to_string()))?;
    let encryption_duration = started.elapsed();

    let ciphertext_size = ciphertext.len();
    Ok(SealedEnvelope {
        ciphertext,
        algorithm: ALGORITHM,
        created_at: Utc::now(),
        encryption_duration,
        plaintext_size: plaintext.len(),
        ciphertext_size,
    })
}

/// Open an authenticated envelope, verifying the tag.
///
/// # Errors
///
/// Returns [`CryptoError::AuthenticationFailure`] when the tag does not
/// verify: wrong key, wrong nonce, mismatched associated data, any altered
/// bit of ciphertext or tag, or input shorter than the tag itself. The
/// failure is a value for callers to match on, never a panic.
pub fn open(
    ciphertext: &[u8],
    key: &SecretKey,
    nonce: &EnvelopeNonce,
    associated_data: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < TAG_LEN {
        return Err(CryptoError::AuthenticationFailure);
    }

    let cipher = Ascon128::new(Key::<Ascon128>::from_slice(key.as_bytes()));
    cipher
        .decrypt(
            Nonce::<Ascon128>::from_slice(nonce.as_bytes()),
            Payload {
                msg: ciphertext,
                aad: associated_data,
            },
        )
        .map_err(|_| CryptoError::AuthenticationFailure)
}
