//! Rolling counters and bounded event history.
//!
//! The aggregator is the single owner of all mutable monitor state. It is
//! intended to live behind an exclusive-update discipline (the monitor
//! actor holds it in a mutex and mutates only from its delivery loop) and
//! exposes immutable snapshots to readers.

use crate::classifier::{ClassifiedEvent, EventCategory, Severity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_types::{RoutingLabel, SensorReading};
use std::collections::VecDeque;

/// Default bounded-history capacity.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Subset of a classified event kept in the unbounded attack log for
/// end-of-session reporting. Append-only.
#[derive(Debug, Clone, Serialize)]
pub struct AttackRecord {
    /// When the attack was observed.
    pub observed_at: DateTime<Utc>,
    /// Attack category.
    pub category: EventCategory,
    /// Label the attack arrived on.
    pub label: RoutingLabel,
    /// Fixed per-category severity.
    pub severity: Severity,
}

/// Monotonic session counters. Reset only at process start.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    /// Legitimate messages observed.
    pub normal_count: u64,
    /// Attack messages observed.
    pub attack_count: u64,
    /// Unclassifiable messages observed.
    pub unknown_count: u64,
    /// Decode/transport errors recorded.
    pub error_count: u64,
    /// Plaintext tamper events.
    pub tamper_plaintext_count: u64,
    /// Ciphertext tamper events.
    pub tamper_ciphertext_count: u64,
    /// Replay events.
    pub replay_count: u64,
    /// Flood events.
    pub dos_count: u64,
    /// When this session started.
    pub session_start: DateTime<Utc>,
}

impl AggregateStats {
    fn new() -> Self {
        Self {
            normal_count: 0,
            attack_count: 0,
            unknown_count: 0,
            error_count: 0,
            tamper_plaintext_count: 0,
            tamper_ciphertext_count: 0,
            replay_count: 0,
            dos_count: 0,
            session_start: Utc::now(),
        }
    }

    /// Total messages observed.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.normal_count + self.attack_count + self.unknown_count
    }

    /// Fraction of observed traffic that was attack traffic, as a
    /// percentage. Zero when nothing has been observed.
    #[must_use]
    pub fn attack_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.attack_count as f64 / total as f64) * 100.0
        }
    }
}

/// Bounded event history plus monotonic counters plus the attack log.
pub struct TelemetryAggregator {
    history: VecDeque<ClassifiedEvent>,
    capacity: usize,
    stats: AggregateStats,
    attack_log: Vec<AttackRecord>,
}

impl TelemetryAggregator {
    /// Create with the default history capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create with a custom history capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            stats: AggregateStats::new(),
            attack_log: Vec::new(),
        }
    }

    /// Record a classified event: append to the bounded history (evicting
    /// the oldest entry when full), update counters, and log attacks.
    pub fn record(&mut self, event: ClassifiedEvent) {
        match event.category {
            EventCategory::NormalPlaintext | EventCategory::NormalEncrypted => {
                self.stats.normal_count += 1;
            }
            EventCategory::TamperPlaintext => {
                self.stats.attack_count += 1;
                self.stats.tamper_plaintext_count += 1;
            }
            EventCategory::TamperCiphertext => {
                self.stats.attack_count += 1;
                self.stats.tamper_ciphertext_count += 1;
            }
            EventCategory::Replay => {
                self.stats.attack_count += 1;
                self.stats.replay_count += 1;
            }
            EventCategory::DenialOfService => {
                self.stats.attack_count += 1;
                self.stats.dos_count += 1;
            }
            EventCategory::Unknown => {
                self.stats.unknown_count += 1;
            }
        }

        if event.category.is_attack() {
            self.attack_log.push(AttackRecord {
                observed_at: event.observed_at,
                category: event.category,
                label: event.label.clone(),
                severity: event.severity,
            });
        }

        self.history.push_back(event);
        while self.history.len() > self.capacity {
            self.history.pop_front();
        }
    }

    /// Record a decode or transport error.
    pub fn record_error(&mut self) {
        self.stats.error_count += 1;
    }

    /// Immutable snapshot of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> AggregateStats {
        self.stats.clone()
    }

    /// Current history length (never exceeds capacity).
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Configured history capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate the retained history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ClassifiedEvent> {
        self.history.iter()
    }

    /// The append-only attack log.
    #[must_use]
    pub fn attack_log(&self) -> &[AttackRecord] {
        &self.attack_log
    }

    /// The most recent legitimate reading still in the history window.
    ///
    /// Only plaintext normals can yield a distance without the key, so the
    /// baseline for anomaly comparison is the newest `NormalPlaintext`
    /// event whose payload parses as a reading.
    #[must_use]
    pub fn last_normal_reading(&self) -> Option<SensorReading> {
        self.history
            .iter()
            .rev()
            .filter(|e| e.category == EventCategory::NormalPlaintext)
            .find_map(|e| SensorReading::from_json(&e.raw_payload).ok())
    }
}

impl Default for TelemetryAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use shared_types::label::{ENC_CHANNEL, RAW_CHANNEL};
    use shared_types::AttackSuffix;

    fn raw_event(payload: &[u8]) -> ClassifiedEvent {
        classify(&RoutingLabel::new(RAW_CHANNEL), payload)
    }

    #[test]
    fn test_history_bound_fifo() {
        let mut agg = TelemetryAggregator::with_capacity(5);
        for i in 0..12u64 {
            let reading = SensorReading::new("S1", i, 25.0);
            agg.record(raw_event(&reading.to_json().unwrap()));
        }

        assert_eq!(agg.history_len(), 5);
        // Retained events are the most recent, in arrival order.
        let counts: Vec<u64> = agg
            .history()
            .map(|e| SensorReading::from_json(&e.raw_payload).unwrap().count)
            .collect();
        assert_eq!(counts, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_per_category_counts() {
        let raw = RoutingLabel::new(RAW_CHANNEL);
        let enc = RoutingLabel::new(ENC_CHANNEL);
        let mut agg = TelemetryAggregator::new();

        agg.record(classify(&raw, b"{}"));
        agg.record(classify(&enc, b"{}"));
        agg.record(classify(&raw.derived(AttackSuffix::Tampered), b"{}"));
        agg.record(classify(&enc.derived(AttackSuffix::Tampered), b"{}"));
        agg.record(classify(&enc.derived(AttackSuffix::Replayed), b"{}"));
        agg.record(classify(&raw.derived(AttackSuffix::Dos), b"{}"));
        agg.record(classify(&RoutingLabel::new("junk/topic"), b"{}"));

        let stats = agg.snapshot();
        assert_eq!(stats.normal_count, 2);
        assert_eq!(stats.attack_count, 4);
        assert_eq!(stats.unknown_count, 1);
        assert_eq!(stats.tamper_plaintext_count, 1);
        assert_eq!(stats.tamper_ciphertext_count, 1);
        assert_eq!(stats.replay_count, 1);
        assert_eq!(stats.dos_count, 1);
        assert_eq!(stats.total(), 7);
    }

    #[test]
    fn test_attack_log_is_append_only_and_unbounded() {
        let raw = RoutingLabel::new(RAW_CHANNEL);
        let mut agg = TelemetryAggregator::with_capacity(3);

        for _ in 0..10 {
            agg.record(classify(&raw.derived(AttackSuffix::Dos), b"{}"));
        }

        // History evicted down to capacity, attack log kept everything.
        assert_eq!(agg.history_len(), 3);
        assert_eq!(agg.attack_log().len(), 10);
    }

    #[test]
    fn test_last_normal_reading() {
        let raw = RoutingLabel::new(RAW_CHANNEL);
        let mut agg = TelemetryAggregator::new();
        assert!(agg.last_normal_reading().is_none());

        agg.record(raw_event(&SensorReading::new("S1", 1, 20.0).to_json().unwrap()));
        agg.record(raw_event(&SensorReading::new("S1", 2, 25.0).to_json().unwrap()));
        agg.record(classify(&raw.derived(AttackSuffix::Tampered), b"{\"distance\":999}"));

        let baseline = agg.last_normal_reading().unwrap();
        assert_eq!(baseline.count, 2);
        assert_eq!(baseline.distance, 25.0);
    }

    #[test]
    fn test_attack_rate() {
        let raw = RoutingLabel::new(RAW_CHANNEL);
        let mut agg = TelemetryAggregator::new();
        assert_eq!(agg.snapshot().attack_rate(), 0.0);

        agg.record(classify(&raw, b"{}"));
        agg.record(classify(&raw.derived(AttackSuffix::Dos), b"{}"));
        agg.record(classify(&raw.derived(AttackSuffix::Dos), b"{}"));
        agg.record(classify(&raw, b"{}"));

        let rate = agg.snapshot().attack_rate();
        assert!((rate - 50.0).abs() < f64::EPSILON);
    }
}
