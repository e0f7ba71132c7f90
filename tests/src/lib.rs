//! # Sentinel-Channel Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── codec_properties.rs   # AEAD envelope codec guarantees
//!     ├── monitor_pipeline.rs   # Classifier, aggregator, anomaly, freshness
//!     └── attack_scenarios.rs   # Full actor choreography over the bus
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sc-tests
//!
//! # By category
//! cargo test -p sc-tests integration::codec_properties::
//! cargo test -p sc-tests integration::monitor_pipeline::
//! cargo test -p sc-tests integration::attack_scenarios::
//! ```

#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
