//! # Channel Monitor (sc-04)
//!
//! Passive observer for the telemetry channel testbed. Subscribes to both
//! legitimate channels and every attack label, classifies each delivery
//! from its routing label alone, compares attack readings against the
//! last-known-good baseline, and aggregates everything into bounded
//! session state for end-of-run reporting.
//!
//! ## Modules
//!
//! - `classifier` - label-driven attack taxonomy (category, severity, outcome)
//! - `anomaly` - threshold comparison against the last normal reading
//! - `aggregator` - bounded history, counters, and the attack log
//! - `freshness` - optional time-bounded replay window over ciphertexts
//! - `report` - end-of-session rendering and attack-log persistence
//! - `service` - the monitor actor wiring it all to the bus

pub mod aggregator;
pub mod anomaly;
pub mod classifier;
pub mod freshness;
pub mod report;
pub mod service;

pub use aggregator::{
    AggregateStats, AttackRecord, TelemetryAggregator, DEFAULT_HISTORY_CAPACITY,
};
pub use anomaly::{AnomalyComparator, AnomalyVerdict, DEFAULT_ANOMALY_THRESHOLD};
pub use classifier::{classify, ClassifiedEvent, EventCategory, Outcome, Severity};
pub use freshness::{FreshnessError, ReplayWindow};
pub use report::SessionReport;
pub use service::{watched_labels, MonitorActor};
