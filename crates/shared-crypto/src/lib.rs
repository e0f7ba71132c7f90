//! # Shared Crypto - Authenticated-Encryption Envelope Codec
//!
//! The only cryptographic surface in the testbed: sealing telemetry into
//! Ascon-128 authenticated envelopes and opening them again, with tag
//! failure surfaced as a first-class outcome rather than a parse error.
//!
//! The AEAD primitive itself is consumed from the `ascon-aead` crate; this
//! crate only specifies how the primitive is *used* (and, by the adversary
//! subsystem, deliberately mis-used).

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod envelope;
mod errors;

pub use envelope::{
    open, seal, EnvelopeNonce, SealedEnvelope, SecretKey, ALGORITHM, KEY_LEN, NONCE_LEN, TAG_LEN,
};
pub use errors::CryptoError;
