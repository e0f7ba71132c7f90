//! Publisher actor: one reading per tick, published on both channels.

use crate::relay::{MetricsRelay, NoOpRelay};
use crate::sensor::DistanceSensor;
use shared_bus::{BusMessage, InMemoryBus, MessagePublisher};
use shared_crypto::{seal, EnvelopeNonce, SecretKey};
use shared_types::label::{ENC_CHANNEL, RAW_CHANNEL};
use shared_types::EnvelopeWire;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Default gap between readings.
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_secs(2);

/// Counters for a publishing session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PublisherStats {
    /// Readings taken from the sensor.
    pub readings: u64,
    /// Clear-channel publishes that reached a subscriber.
    pub raw_published: u64,
    /// Encrypted-channel publishes that reached a subscriber.
    pub enc_published: u64,
    /// Publishes that reached nobody, plus seal and relay failures.
    pub errors: u64,
    /// Wall time spent sealing, summed across readings.
    pub total_encryption_ms: f64,
}

impl PublisherStats {
    /// Mean sealing time per sealed reading, or zero before the first.
    #[must_use]
    pub fn avg_encryption_ms(&self) -> f64 {
        if self.enc_published == 0 {
            0.0
        } else {
            self.total_encryption_ms / self.enc_published as f64
        }
    }
}

/// Periodically reads the sensor and publishes each reading twice: the
/// clear JSON on the raw channel, the sealed envelope on the encrypted
/// channel.
///
/// The two publishes carry the same plaintext by construction, which is
/// what lets the testbed contrast attack outcomes across channels.
pub struct PublisherActor {
    bus: Arc<InMemoryBus>,
    sensor: DistanceSensor,
    key: SecretKey,
    nonce: EnvelopeNonce,
    associated_data: Vec<u8>,
    relay: Arc<dyn MetricsRelay>,
    interval: Duration,
    stats: PublisherStats,
    shutdown: watch::Receiver<bool>,
}

impl PublisherActor {
    #[must_use]
    pub fn new(
        bus: Arc<InMemoryBus>,
        sensor: DistanceSensor,
        key: SecretKey,
        nonce: EnvelopeNonce,
        associated_data: &[u8],
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            bus,
            sensor,
            key,
            nonce,
            associated_data: associated_data.to_vec(),
            relay: Arc::new(NoOpRelay),
            interval: DEFAULT_PUBLISH_INTERVAL,
            stats: PublisherStats::default(),
            shutdown,
        }
    }

    /// Override the publish interval; tests use short ones.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Attach an external metrics sink.
    #[must_use]
    pub fn with_relay(mut self, relay: Arc<dyn MetricsRelay>) -> Self {
        self.relay = relay;
        self
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> PublisherStats {
        self.stats
    }

    /// Take one reading and publish it on both channels.
    ///
    /// Failures are folded into the error counter rather than propagated;
    /// a publishing session outlives individual bad ticks.
    pub async fn publish_once(&mut self) {
        let reading = self.sensor.read();
        self.stats.readings += 1;

        let payload = match reading.to_json() {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, "Reading did not serialize");
                self.stats.errors += 1;
                return;
            }
        };

        // Clear channel first, mirroring the device ordering.
        let raw_acks = self
            .bus
            .publish(BusMessage::new(RAW_CHANNEL, payload.clone()))
            .await;
        if raw_acks > 0 {
            self.stats.raw_published += 1;
        } else {
            warn!(channel = RAW_CHANNEL, "Publish reached no subscribers");
            self.stats.errors += 1;
        }

        match seal(&payload, &self.key, &self.nonce, &self.associated_data) {
            Ok(sealed) => {
                let mut wire = EnvelopeWire::from_ciphertext(&sealed.ciphertext, sealed.algorithm);
                wire.timestamp = Some(sealed.created_at.to_rfc3339());
                wire.original_size = Some(sealed.plaintext_size);
                wire.encrypted_size = Some(sealed.ciphertext_size);
                wire.encryption_time_ms = Some(sealed.encryption_time_ms());

                match wire.encode() {
                    Ok(envelope) => {
                        let enc_acks = self
                            .bus
                            .publish(BusMessage::new(ENC_CHANNEL, envelope))
                            .await;
                        if enc_acks > 0 {
                            self.stats.enc_published += 1;
                            self.stats.total_encryption_ms += sealed.encryption_time_ms();
                        } else {
                            warn!(channel = ENC_CHANNEL, "Publish reached no subscribers");
                            self.stats.errors += 1;
                        }
                        debug!(
                            count = reading.count,
                            distance = reading.distance,
                            encryption_ms = sealed.encryption_time_ms(),
                            "Reading published on both channels"
                        );
                    }
                    Err(err) => {
                        warn!(%err, "Envelope did not serialize");
                        self.stats.errors += 1;
                    }
                }
            }
            Err(err) => {
                warn!(%err, "Sealing failed");
                self.stats.errors += 1;
            }
        }

        if let Err(err) = self.relay.relay(&reading).await {
            debug!(%err, "Metrics relay failed");
            self.stats.errors += 1;
        }
    }

    /// Publish on every tick until shutdown, returning final counters.
    pub async fn run(mut self) -> PublisherStats {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Publisher started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.publish_once().await;
                }
            }
        }

        info!(
            readings = self.stats.readings,
            errors = self.stats.errors,
            "Publisher stopped"
        );
        self.stats
    }
}
