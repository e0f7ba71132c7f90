//! Monitor pipeline: classifier, aggregator, anomaly, freshness.

#[cfg(test)]
mod tests {
    use sc_04_monitor::{
        classify, AnomalyComparator, EventCategory, FreshnessError, Outcome, ReplayWindow,
        Severity, TelemetryAggregator, DEFAULT_HISTORY_CAPACITY,
    };
    use shared_types::label::{ENC_CHANNEL, RAW_CHANNEL};
    use shared_types::{AttackSuffix, RoutingLabel, SensorReading};

    fn raw() -> RoutingLabel {
        RoutingLabel::new(RAW_CHANNEL)
    }

    fn enc() -> RoutingLabel {
        RoutingLabel::new(ENC_CHANNEL)
    }

    #[test]
    fn test_decision_table_end_to_end() {
        let cases = [
            (raw(), EventCategory::NormalPlaintext, Severity::None, Outcome::Unknown),
            (enc(), EventCategory::NormalEncrypted, Severity::None, Outcome::Unknown),
            (
                raw().derived(AttackSuffix::Tampered),
                EventCategory::TamperPlaintext,
                Severity::High,
                Outcome::Successful,
            ),
            (
                enc().derived(AttackSuffix::Tampered),
                EventCategory::TamperCiphertext,
                Severity::Medium,
                Outcome::Blocked,
            ),
            (
                enc().derived(AttackSuffix::Replayed),
                EventCategory::Replay,
                Severity::Medium,
                Outcome::Successful,
            ),
            (
                raw().derived(AttackSuffix::Dos),
                EventCategory::DenialOfService,
                Severity::High,
                Outcome::InProgress,
            ),
        ];

        for (label, category, severity, outcome) in cases {
            let event = classify(&label, b"{}");
            assert_eq!(event.category, category, "label {label}");
            assert_eq!(event.severity, severity, "label {label}");
            assert_eq!(event.outcome, outcome, "label {label}");
        }
    }

    #[test]
    fn test_classification_is_payload_independent() {
        let label = enc().derived(AttackSuffix::Replayed);
        let from_empty = classify(&label, b"");
        let from_garbage = classify(&label, &[0xFF, 0x00, 0xAB]);
        assert_eq!(from_empty.category, from_garbage.category);
        assert_eq!(from_empty.severity, from_garbage.severity);
        assert_eq!(from_empty.outcome, from_garbage.outcome);
    }

    #[test]
    fn test_history_keeps_most_recent_in_order() {
        // More events than the window holds; the oldest must fall out.
        let mut agg = TelemetryAggregator::new();
        let total = DEFAULT_HISTORY_CAPACITY as u64 + 10;

        for i in 0..total {
            let reading = SensorReading::new("S1", i, 25.0);
            agg.record(classify(&raw(), &reading.to_json().unwrap()));
        }

        assert_eq!(agg.history_len(), DEFAULT_HISTORY_CAPACITY);
        let counts: Vec<u64> = agg
            .history()
            .map(|e| SensorReading::from_json(&e.raw_payload).unwrap().count)
            .collect();
        let expected: Vec<u64> = (10..total).collect();
        assert_eq!(counts, expected);
    }

    #[test]
    fn test_anomaly_sentinel_against_baseline() {
        let comparator = AnomalyComparator::default();
        let baseline = SensorReading::new("S1", 1, 25.0);
        let forged = SensorReading::new("S1", 2, 999.0);

        let verdict = comparator.compare(&forged, &baseline);
        assert_eq!(verdict.delta, 974.0);
        assert!(verdict.is_anomalous);

        let ordinary = SensorReading::new("S1", 3, 28.0);
        let verdict = comparator.compare(&ordinary, &baseline);
        assert_eq!(verdict.delta, 3.0);
        assert!(!verdict.is_anomalous);
    }

    #[test]
    fn test_flood_counted_per_message() {
        let mut agg = TelemetryAggregator::new();
        let label = raw().derived(AttackSuffix::Dos);

        for i in 0..20u64 {
            let mut reading = SensorReading::new("FLOOD", i, 999.0);
            reading.fake = true;
            agg.record(classify(&label, &reading.to_json().unwrap()));
        }

        let stats = agg.snapshot();
        assert_eq!(stats.dos_count, 20);
        assert_eq!(stats.attack_count, 20);
        assert_eq!(agg.attack_log().len(), 20);
    }

    #[test]
    fn test_baseline_survives_attack_traffic() {
        let mut agg = TelemetryAggregator::new();
        agg.record(classify(
            &raw(),
            &SensorReading::new("S1", 7, 24.5).to_json().unwrap(),
        ));
        for _ in 0..5 {
            agg.record(classify(&raw().derived(AttackSuffix::Dos), b"{}"));
        }

        // Attacks in between do not move the last-normal baseline.
        let baseline = agg.last_normal_reading().unwrap();
        assert_eq!(baseline.count, 7);
        assert_eq!(baseline.distance, 24.5);
    }

    #[test]
    fn test_freshness_window_flags_reuse() {
        let mut window = ReplayWindow::new();
        let now = chrono::Utc::now().timestamp() as u64;

        assert!(window.check_and_remember(b"envelope-bytes", now).is_ok());
        assert!(matches!(
            window.check_and_remember(b"envelope-bytes", now),
            Err(FreshnessError::CiphertextReused { .. })
        ));
        assert!(window.check_and_remember(b"other-envelope", now).is_ok());
    }
}
