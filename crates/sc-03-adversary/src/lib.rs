//! # Adversary Simulators (sc-03)
//!
//! The hostile half of the telemetry channel testbed. One passive
//! adversary (eavesdropping with a wrong key) and one active adversary
//! (plaintext tamper, ciphertext tamper, replay, flood), both working
//! over the same bus as the honest actors.
//!
//! Attacks are label-honest: derived messages are republished on the
//! victim label plus an attack suffix rather than on the victim label
//! itself, so monitors classify by routing alone.

pub mod active;
pub mod errors;
pub mod mailbox;
pub mod passive;

pub use active::{
    flip_ciphertext, verify_tamper_blocked, ActiveAdversary, CiphertextTamper, FloodSummary,
    PlaintextTamper, Replay, FLIP_FIRST_MASK, FLIP_SECOND_MASK, SENTINEL_DISTANCE,
};
pub use errors::AdversaryError;
pub use mailbox::{spawn_capture_task, CaptureMailbox, DEFAULT_CAPTURE_TIMEOUT};
pub use passive::{
    Eavesdropper, EavesdropSummary, Observation, PassiveState, WRONG_KEY, WRONG_NONCE,
};
