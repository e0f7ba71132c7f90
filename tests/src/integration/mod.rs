//! Integration tests across testbed subsystems.

pub mod attack_scenarios;
pub mod codec_properties;
pub mod monitor_pipeline;
