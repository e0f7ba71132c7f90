//! # Shared Types Crate
//!
//! Cross-subsystem types for the Sentinel-Channel testbed.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a subsystem
//!   boundary (sensor readings, routing labels, the encrypted-envelope wire
//!   format) is defined here.
//! - **Tolerant Decoding**: wire decoders accept extra fields and default
//!   missing optional ones; only structurally required fields are enforced.
//! - **Labels Are Hints**: `RoutingLabel` parsing produces an explicit
//!   `(ChannelKind, SuffixKind)` pair instead of ad-hoc substring checks.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod errors;
pub mod label;
pub mod reading;
pub mod wire;

pub use errors::WireError;
pub use label::{AttackSuffix, ChannelKind, LabelParts, RoutingLabel, SuffixKind};
pub use reading::{ReadingTimestamp, SensorReading};
pub use wire::EnvelopeWire;
