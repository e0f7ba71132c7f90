//! Full actor choreography over one in-memory bus.
//!
//! Every test wires the real actors together the way the runtime does:
//! observers subscribe before any traffic flows, the publisher drives
//! readings onto both channels, and the adversaries intercept live
//! traffic rather than fixtures.

#[cfg(test)]
mod tests {
    use sc_01_publisher::{DistanceSensor, PublisherActor};
    use sc_02_subscriber::SubscriberActor;
    use sc_03_adversary::{
        verify_tamper_blocked, ActiveAdversary, Eavesdropper, SENTINEL_DISTANCE,
    };
    use sc_04_monitor::{MonitorActor, ReplayWindow};
    use shared_bus::InMemoryBus;
    use shared_crypto::{EnvelopeNonce, SecretKey};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    const KEY: &[u8; 16] = b"asconciphertest1";
    const NONCE: &[u8; 16] = b"asconcipher1test";
    const AD: &[u8] = b"ASCON";

    fn secrets() -> (SecretKey, EnvelopeNonce) {
        (SecretKey::from_bytes(*KEY), EnvelopeNonce::from_bytes(*NONCE))
    }

    fn publisher(
        bus: Arc<InMemoryBus>,
        shutdown: watch::Receiver<bool>,
    ) -> PublisherActor {
        let (key, nonce) = secrets();
        PublisherActor::new(
            bus,
            DistanceSensor::with_profile("S1", 25.0, 0.0),
            key,
            nonce,
            AD,
            shutdown,
        )
        .with_interval(Duration::from_millis(30))
    }

    /// Wait until the monitor's counters satisfy a predicate.
    async fn wait_for<F>(
        handle: &std::sync::Arc<parking_lot::Mutex<sc_04_monitor::TelemetryAggregator>>,
        predicate: F,
    ) where
        F: Fn(&sc_04_monitor::AggregateStats) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if predicate(&handle.lock().snapshot()) {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("monitor never reached expected state");
    }

    #[tokio::test]
    async fn test_full_attack_scenario() {
        let bus = Arc::new(InMemoryBus::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Observers before traffic.
        let monitor = MonitorActor::new(&bus, shutdown_rx.clone())
            .with_replay_window(ReplayWindow::new());
        let stats_handle = monitor.aggregator_handle();
        let monitor_task = tokio::spawn(monitor.run());

        let (key, nonce) = secrets();
        let subscriber = SubscriberActor::new(&bus, key, nonce, AD, shutdown_rx.clone());
        let subscriber_task = tokio::spawn(subscriber.run());

        let adversary = ActiveAdversary::new(Arc::clone(&bus))
            .with_capture_timeout(Duration::from_secs(3));
        let publisher_task = tokio::spawn(publisher(Arc::clone(&bus), shutdown_rx).run());

        // Let normal traffic flow first so the monitor has a baseline.
        wait_for(&stats_handle, |s| s.normal_count >= 4).await;

        let tamper = adversary.tamper_plaintext().await.unwrap();
        assert_eq!(tamper.forged.distance, SENTINEL_DISTANCE);

        let flip = adversary.tamper_ciphertext().await.unwrap();
        let (key, nonce) = secrets();
        verify_tamper_blocked(&flip.flipped_ciphertext, &key, &nonce, AD).unwrap();

        let replay = adversary.replay().await.unwrap();
        assert!(replay.acks >= 1);

        let flood = adversary.flood(5).await;
        assert_eq!(flood.sent, 5);

        wait_for(&stats_handle, |s| {
            s.tamper_plaintext_count >= 1
                && s.tamper_ciphertext_count >= 1
                && s.replay_count >= 1
                && s.dos_count >= 5
        })
        .await;

        shutdown_tx.send(true).unwrap();
        let report = tokio::time::timeout(Duration::from_secs(3), monitor_task)
            .await
            .unwrap()
            .unwrap();
        let subscriber_stats = tokio::time::timeout(Duration::from_secs(3), subscriber_task)
            .await
            .unwrap()
            .unwrap();
        let publisher_stats = tokio::time::timeout(Duration::from_secs(3), publisher_task)
            .await
            .unwrap()
            .unwrap();

        // The monitor saw every attack and attributed severities.
        assert!(report.stats().attack_count >= 8);
        assert!(report.attacks().len() >= 8);

        // The honest path never broke: the subscriber only rejects the
        // flipped envelope if it sees it, and it listens on the clean
        // channel only, so every delivery it got must have decrypted.
        assert_eq!(subscriber_stats.rejected, 0);
        assert!(subscriber_stats.decrypted >= 4);

        // Publisher saw acks for everything it sent.
        assert_eq!(publisher_stats.errors, 0);
    }

    #[tokio::test]
    async fn test_eavesdropper_learns_nothing_while_subscriber_reads() {
        let bus = Arc::new(InMemoryBus::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let (key, nonce) = secrets();
        let subscriber = SubscriberActor::new(&bus, key, nonce, AD, shutdown_rx.clone());
        let subscriber_task = tokio::spawn(subscriber.run());

        let eavesdropper = Eavesdropper::new(&bus, AD, shutdown_rx.clone());
        let eavesdropper_task = tokio::spawn(eavesdropper.run());

        let publisher_task = tokio::spawn(publisher(Arc::clone(&bus), shutdown_rx).run());

        tokio::time::sleep(Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();

        let subscriber_stats = subscriber_task.await.unwrap();
        let summary = eavesdropper_task.await.unwrap();
        publisher_task.await.unwrap();

        // Same ciphertexts, opposite outcomes: the key is the only
        // difference between the two receivers.
        assert!(subscriber_stats.decrypted >= 1);
        assert!(summary.intercepted >= 1);
        assert_eq!(summary.exposed, 0);
        assert_eq!(summary.rejected, summary.intercepted);
        assert!(summary.channel_held());
    }

    #[tokio::test]
    async fn test_replayed_envelope_still_decrypts() {
        // A replay is not a forgery: the subscriber cannot tell the copy
        // from the original, which is exactly why the monitor tracks it
        // as a successful attack.
        let bus = Arc::new(InMemoryBus::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let adversary = ActiveAdversary::new(Arc::clone(&bus))
            .with_capture_timeout(Duration::from_secs(3));
        let publisher_task = tokio::spawn(publisher(Arc::clone(&bus), shutdown_rx).run());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let replay = adversary.replay().await.unwrap();

        let envelope = shared_types::EnvelopeWire::decode(&replay.payload).unwrap();
        let (key, nonce) = secrets();
        let plaintext =
            shared_crypto::open(&envelope.ciphertext().unwrap(), &key, &nonce, AD).unwrap();
        let reading = shared_types::SensorReading::from_json(&plaintext).unwrap();
        assert_eq!(reading.distance, 25.0);

        shutdown_tx.send(true).unwrap();
        publisher_task.await.unwrap();
    }
}
