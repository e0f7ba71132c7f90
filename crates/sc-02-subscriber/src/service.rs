//! Subscriber actor: envelope decode and authenticated decryption.

use shared_bus::{InMemoryBus, LabelFilter, Subscription};
use shared_crypto::{open, EnvelopeNonce, SecretKey};
use shared_types::label::ENC_CHANNEL;
use shared_types::{EnvelopeWire, SensorReading};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What happened to one delivery on the encrypted channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DecryptOutcome {
    /// Envelope opened and the reading parsed.
    Reading(SensorReading),
    /// Envelope opened but the plaintext was not a reading.
    OpaquePlaintext,
    /// Authentication failed; the envelope was rejected.
    Rejected,
    /// The payload was not a parseable envelope.
    Unparseable,
}

/// Counters for a receiving session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SubscriberStats {
    /// Deliveries received on the encrypted channel.
    pub received: u64,
    /// Envelopes that opened and parsed into readings.
    pub decrypted: u64,
    /// Envelopes rejected by authentication.
    pub rejected: u64,
    /// Payloads that were not parseable envelopes.
    pub unparseable: u64,
    /// Total time spent in decryption, milliseconds.
    pub total_decryption_ms: f64,
}

impl SubscriberStats {
    /// Mean decryption time per successfully opened envelope.
    #[must_use]
    pub fn avg_decryption_ms(&self) -> f64 {
        if self.decrypted == 0 {
            0.0
        } else {
            self.total_decryption_ms / self.decrypted as f64
        }
    }
}

/// Listens on the encrypted channel and opens every envelope.
pub struct SubscriberActor {
    subscription: Subscription,
    key: SecretKey,
    nonce: EnvelopeNonce,
    associated_data: Vec<u8>,
    stats: SubscriberStats,
    shutdown: watch::Receiver<bool>,
}

impl SubscriberActor {
    /// Subscribe to the encrypted channel with the real channel secrets.
    #[must_use]
    pub fn new(
        bus: &InMemoryBus,
        key: SecretKey,
        nonce: EnvelopeNonce,
        associated_data: &[u8],
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            subscription: bus.subscribe(LabelFilter::labels([ENC_CHANNEL])),
            key,
            nonce,
            associated_data: associated_data.to_vec(),
            stats: SubscriberStats::default(),
            shutdown,
        }
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> SubscriberStats {
        self.stats
    }

    /// Handle one delivery: decode, open, parse.
    pub fn handle(&mut self, payload: &[u8]) -> DecryptOutcome {
        self.stats.received += 1;

        let Ok(envelope) = EnvelopeWire::decode(payload) else {
            self.stats.unparseable += 1;
            warn!("Delivery was not a parseable envelope");
            return DecryptOutcome::Unparseable;
        };
        let Ok(ciphertext) = envelope.ciphertext() else {
            self.stats.unparseable += 1;
            return DecryptOutcome::Unparseable;
        };

        let started = Instant::now();
        let plaintext = match open(&ciphertext, &self.key, &self.nonce, &self.associated_data) {
            Ok(plaintext) => plaintext,
            Err(err) => {
                self.stats.rejected += 1;
                warn!(%err, "Envelope rejected");
                return DecryptOutcome::Rejected;
            }
        };
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        self.stats.decrypted += 1;
        self.stats.total_decryption_ms += elapsed_ms;

        match SensorReading::from_json(&plaintext) {
            Ok(reading) => {
                debug!(
                    count = reading.count,
                    distance = reading.distance,
                    decryption_ms = elapsed_ms,
                    "Reading recovered"
                );
                DecryptOutcome::Reading(reading)
            }
            Err(err) => {
                debug!(%err, "Plaintext was not a reading");
                DecryptOutcome::OpaquePlaintext
            }
        }
    }

    /// Run until shutdown, returning final counters.
    pub async fn run(mut self) -> SubscriberStats {
        info!("Subscriber listening on {}", ENC_CHANNEL);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                message = self.subscription.recv() => {
                    let Some(message) = message else { break };
                    self.handle(&message.payload);
                }
            }
        }

        info!(
            received = self.stats.received,
            decrypted = self.stats.decrypted,
            rejected = self.stats.rejected,
            avg_decryption_ms = self.stats.avg_decryption_ms(),
            "Subscriber stopped"
        );
        self.stats
    }
}
