//! Encrypted-envelope wire format.
//!
//! The object exchanged on the encrypted channel:
//!
//! ```json
//! {
//!   "encrypted_data": "<hex of ciphertext+tag>",
//!   "algorithm": "Ascon-128",
//!   "timestamp": "<ISO-8601>",
//!   "original_size": 64,
//!   "encrypted_size": 80,
//!   "encryption_time_ms": 0.031
//! }
//! ```
//!
//! Decoders tolerate extra and missing optional fields but require
//! `encrypted_data` to be valid even-length hex.

use crate::errors::WireError;
use serde::{Deserialize, Serialize};

fn is_false(v: &bool) -> bool {
    !v
}

/// JSON envelope carrying an authenticated ciphertext across the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeWire {
    /// Hex encoding of ciphertext plus appended authentication tag.
    pub encrypted_data: String,
    /// AEAD algorithm identifier.
    #[serde(default)]
    pub algorithm: Option<String>,
    /// Sealing timestamp, ISO-8601.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Plaintext size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<usize>,
    /// Ciphertext size in bytes (plaintext + tag).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_size: Option<usize>,
    /// How long sealing took, milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_time_ms: Option<f64>,
    /// Marker written by a ciphertext-tampering adversary.
    #[serde(rename = "TAMPERED", default, skip_serializing_if = "is_false")]
    pub tampered: bool,
}

impl EnvelopeWire {
    /// Build an envelope around raw ciphertext, hex-encoding it.
    ///
    /// Metadata fields start unset; callers fill what they know.
    #[must_use]
    pub fn from_ciphertext(ciphertext: &[u8], algorithm: impl Into<String>) -> Self {
        Self {
            encrypted_data: hex::encode(ciphertext),
            algorithm: Some(algorithm.into()),
            timestamp: None,
            original_size: None,
            encrypted_size: None,
            encryption_time_ms: None,
            tampered: false,
        }
    }

    /// Decode from JSON bytes and validate the hex field.
    ///
    /// # Errors
    ///
    /// `WireError::MalformedEnvelope` if the JSON does not parse or
    /// `encrypted_data` is not valid even-length hex.
    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        let wire: Self = serde_json::from_slice(bytes)
            .map_err(|e| WireError::MalformedEnvelope(e.to_string()))?;
        wire.validate_hex()?;
        Ok(wire)
    }

    /// Encode to JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(|e| WireError::MalformedEnvelope(e.to_string()))
    }

    /// Decode the `encrypted_data` hex into raw ciphertext bytes.
    pub fn ciphertext(&self) -> Result<Vec<u8>, WireError> {
        self.validate_hex()?;
        hex::decode(&self.encrypted_data)
            .map_err(|e| WireError::MalformedEnvelope(format!("invalid hex: {e}")))
    }

    /// Replace the ciphertext, re-encoding as lowercase hex.
    pub fn set_ciphertext(&mut self, ciphertext: &[u8]) {
        self.encrypted_data = hex::encode(ciphertext);
    }

    fn validate_hex(&self) -> Result<(), WireError> {
        if self.encrypted_data.len() % 2 != 0 {
            return Err(WireError::MalformedEnvelope(
                "odd-length encrypted_data hex".to_string(),
            ));
        }
        if !self.encrypted_data.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(WireError::MalformedEnvelope(
                "non-hex character in encrypted_data".to_string(),
            ));
        }
        Ok(())
    }
}
