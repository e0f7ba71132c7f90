//! Monitor actor: classifies every bus message and maintains session state.

use crate::aggregator::TelemetryAggregator;
use crate::anomaly::AnomalyComparator;
use crate::classifier::{classify, EventCategory};
use crate::freshness::{FreshnessError, ReplayWindow};
use crate::report::SessionReport;
use parking_lot::Mutex;
use shared_bus::{InMemoryBus, LabelFilter, Subscription};
use shared_types::label::{ENC_CHANNEL, RAW_CHANNEL};
use shared_types::{AttackSuffix, ChannelKind, EnvelopeWire, RoutingLabel};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// The six labels a monitoring session watches: both legitimate channels
/// plus every attack label the adversaries republish on.
#[must_use]
pub fn watched_labels() -> Vec<RoutingLabel> {
    let raw = RoutingLabel::new(RAW_CHANNEL);
    let enc = RoutingLabel::new(ENC_CHANNEL);
    vec![
        raw.clone(),
        enc.clone(),
        raw.derived(AttackSuffix::Tampered),
        enc.derived(AttackSuffix::Tampered),
        enc.derived(AttackSuffix::Replayed),
        raw.derived(AttackSuffix::Dos),
    ]
}

/// Long-running monitor over the full label set.
///
/// Owns the only mutable reference to the aggregator during its delivery
/// loop; external readers take snapshots through the shared handle.
pub struct MonitorActor {
    subscription: Subscription,
    aggregator: Arc<Mutex<TelemetryAggregator>>,
    comparator: AnomalyComparator,
    replay_window: Option<ReplayWindow>,
    shutdown: watch::Receiver<bool>,
}

impl MonitorActor {
    /// Subscribe to the full watched label set on the given bus.
    #[must_use]
    pub fn new(bus: &InMemoryBus, shutdown: watch::Receiver<bool>) -> Self {
        let filter = LabelFilter::labels(watched_labels().into_iter().map(|l| l.to_string()));
        Self {
            subscription: bus.subscribe(filter),
            aggregator: Arc::new(Mutex::new(TelemetryAggregator::new())),
            comparator: AnomalyComparator::default(),
            replay_window: None,
            shutdown,
        }
    }

    /// Enable the optional ciphertext freshness window.
    ///
    /// Freshness findings are logged as a side channel only; label-derived
    /// classification is never changed by them.
    #[must_use]
    pub fn with_replay_window(mut self, window: ReplayWindow) -> Self {
        self.replay_window = Some(window);
        self
    }

    /// Shared handle to the session aggregator, for external snapshots.
    #[must_use]
    pub fn aggregator_handle(&self) -> Arc<Mutex<TelemetryAggregator>> {
        Arc::clone(&self.aggregator)
    }

    /// Run until shutdown, then produce the session report.
    pub async fn run(mut self) -> SessionReport {
        info!("Monitor watching {} labels", watched_labels().len());

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                message = self.subscription.recv() => {
                    let Some(message) = message else {
                        warn!("Bus closed, monitor stopping");
                        break;
                    };
                    self.observe(&message.label, &message.payload);
                }
            }
        }

        let aggregator = self.aggregator.lock();
        let report = SessionReport::new(aggregator.snapshot(), aggregator.attack_log().to_vec());
        info!(
            total = report.stats().total(),
            attacks = report.stats().attack_count,
            "Monitor session complete"
        );
        report
    }

    /// Classify a single delivery and fold it into session state.
    fn observe(&mut self, label: &RoutingLabel, payload: &[u8]) {
        let event = classify(label, payload);
        let mut aggregator = self.aggregator.lock();

        match event.category {
            EventCategory::NormalPlaintext | EventCategory::NormalEncrypted => {
                debug!(%label, category = %event.category, "Normal traffic");
            }
            EventCategory::Unknown => {
                warn!(%label, "Unclassifiable message");
            }
            _ => {
                // Anomaly comparison uses the newest legitimate reading
                // still in the history window as the baseline.
                let baseline = aggregator.last_normal_reading();
                let verdict = shared_types::SensorReading::from_json(payload)
                    .ok()
                    .zip(baseline.as_ref())
                    .map(|(reading, base)| self.comparator.compare(&reading, base));

                match verdict {
                    Some(v) if v.is_anomalous => warn!(
                        %label,
                        category = %event.category,
                        severity = %event.severity,
                        outcome = %event.outcome,
                        delta = v.delta,
                        "ATTACK detected with anomalous reading"
                    ),
                    _ => warn!(
                        %label,
                        category = %event.category,
                        severity = %event.severity,
                        outcome = %event.outcome,
                        "ATTACK detected"
                    ),
                }
            }
        }

        aggregator.record(event.clone());
        drop(aggregator);

        let is_replay = event.category == EventCategory::Replay;
        let is_legit_encrypted =
            label.channel_kind() == ChannelKind::Encrypted && !event.category.is_attack();
        if is_replay || is_legit_encrypted {
            let Some(ciphertext) = self.decode_ciphertext(payload) else {
                return;
            };
            if is_replay {
                self.check_freshness(&ciphertext);
            } else {
                self.remember_ciphertext(&ciphertext);
            }
        }
    }

    /// Extract the ciphertext from an encrypted-channel payload.
    ///
    /// Decode failures are recorded in the session error counter whether or
    /// not the freshness window is enabled.
    fn decode_ciphertext(&self, payload: &[u8]) -> Option<Vec<u8>> {
        match EnvelopeWire::decode(payload).and_then(|e| e.ciphertext()) {
            Ok(ciphertext) => Some(ciphertext),
            Err(err) => {
                warn!(%err, "Undecodable envelope on the encrypted channel");
                self.aggregator.lock().record_error();
                None
            }
        }
    }

    /// Remember a legitimate ciphertext so later replays are recognizable.
    fn remember_ciphertext(&mut self, ciphertext: &[u8]) {
        let Some(window) = self.replay_window.as_mut() else {
            return;
        };
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        if let Err(err) = window.check_and_remember(ciphertext, now) {
            debug!(%err, "Freshness window rejected legitimate ciphertext");
        }
    }

    /// Corroborate a label-derived replay verdict against the window.
    fn check_freshness(&mut self, ciphertext: &[u8]) {
        let Some(window) = self.replay_window.as_mut() else {
            return;
        };
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        match window.check_and_remember(ciphertext, now) {
            Err(FreshnessError::CiphertextReused { fingerprint }) => {
                info!(fingerprint, "Replay corroborated: ciphertext seen before");
            }
            Err(err) => debug!(%err, "Freshness check inconclusive"),
            Ok(()) => debug!("Replayed ciphertext not present in freshness window"),
        }
    }
}
