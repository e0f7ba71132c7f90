//! Passive eavesdropper.
//!
//! Listens on both channels without the key. Clear readings fall out of
//! the raw channel for free; envelopes on the encrypted channel get a
//! decryption attempt with a deliberately wrong key, and every such
//! attempt must fail authentication. A single success would mean the
//! channel leaks plaintext. The eavesdropper never publishes.

use shared_bus::{InMemoryBus, LabelFilter, Subscription};
use shared_crypto::{open, EnvelopeNonce, SecretKey};
use shared_types::label::{ENC_CHANNEL, RAW_CHANNEL};
use shared_types::{ChannelKind, EnvelopeWire, SensorReading};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Key an eavesdropper guesses with. 16 bytes, deliberately wrong.
pub const WRONG_KEY: &[u8; 16] = b"wrongkeywrongkey";

/// Nonce an eavesdropper guesses with. 16 bytes, deliberately wrong.
pub const WRONG_NONCE: &[u8; 16] = b"wrongnoncewrong1";

/// Lifecycle of an eavesdropping session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassiveState {
    /// Created, not yet running.
    Idle,
    /// Delivery loop active.
    Listening,
    /// Shut down; summary is final.
    Stopped,
}

/// What the eavesdropper learned from one intercepted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// A clear reading, read without any effort.
    ClearReading,
    /// Decryption failed authentication, as the channel promises.
    Opaque,
    /// Decryption produced bytes. The channel is broken.
    Exposed,
    /// The payload was not parseable for its channel.
    Unparseable,
}

/// Counts from a completed eavesdropping session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EavesdropSummary {
    /// Clear readings captured off the raw channel.
    pub raw_captured: u64,
    /// Envelopes intercepted off the encrypted channel.
    pub intercepted: u64,
    /// Decryption attempts rejected by authentication.
    pub rejected: u64,
    /// Decryption attempts that yielded plaintext (must stay zero).
    pub exposed: u64,
    /// Payloads that were not parseable for their channel.
    pub unparseable: u64,
}

impl EavesdropSummary {
    /// True when every intercepted envelope stayed opaque.
    #[must_use]
    pub fn channel_held(&self) -> bool {
        self.exposed == 0
    }
}

/// Eavesdrops on both channels with a wrong key.
pub struct Eavesdropper {
    subscription: Subscription,
    key: SecretKey,
    nonce: EnvelopeNonce,
    associated_data: Vec<u8>,
    state: PassiveState,
    summary: EavesdropSummary,
    shutdown: watch::Receiver<bool>,
}

impl Eavesdropper {
    /// Subscribe to both channels with the default wrong guesses.
    #[must_use]
    pub fn new(bus: &InMemoryBus, associated_data: &[u8], shutdown: watch::Receiver<bool>) -> Self {
        Self {
            subscription: bus.subscribe(LabelFilter::labels([RAW_CHANNEL, ENC_CHANNEL])),
            key: SecretKey::from_bytes(*WRONG_KEY),
            nonce: EnvelopeNonce::from_bytes(*WRONG_NONCE),
            associated_data: associated_data.to_vec(),
            state: PassiveState::Idle,
            summary: EavesdropSummary::default(),
            shutdown,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PassiveState {
        self.state
    }

    /// Read one clear-channel capture. Always succeeds when the payload
    /// is a reading, which is the whole point of the raw channel being a
    /// vulnerability.
    pub fn inspect_raw(&mut self, payload: &[u8]) -> Observation {
        match SensorReading::from_json(payload) {
            Ok(reading) => {
                self.summary.raw_captured += 1;
                debug!(
                    distance = reading.distance,
                    count = reading.count,
                    "Eavesdropper read a clear reading"
                );
                Observation::ClearReading
            }
            Err(_) => {
                self.summary.unparseable += 1;
                Observation::Unparseable
            }
        }
    }

    /// Attempt to read one intercepted envelope without the real key.
    pub fn inspect_encrypted(&mut self, payload: &[u8]) -> Observation {
        self.summary.intercepted += 1;

        let Ok(envelope) = EnvelopeWire::decode(payload) else {
            self.summary.unparseable += 1;
            return Observation::Unparseable;
        };
        let Ok(ciphertext) = envelope.ciphertext() else {
            self.summary.unparseable += 1;
            return Observation::Unparseable;
        };

        match open(&ciphertext, &self.key, &self.nonce, &self.associated_data) {
            Err(_) => {
                self.summary.rejected += 1;
                Observation::Opaque
            }
            Ok(_) => {
                self.summary.exposed += 1;
                warn!("Eavesdropper decrypted an envelope without the key");
                Observation::Exposed
            }
        }
    }

    /// Run until shutdown, returning the session summary.
    pub async fn run(mut self) -> EavesdropSummary {
        self.state = PassiveState::Listening;
        info!("Eavesdropper listening on {} and {}", RAW_CHANNEL, ENC_CHANNEL);

        loop {
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() || *self.shutdown.borrow() {
                        break;
                    }
                }
                message = self.subscription.recv() => {
                    let Some(message) = message else { break };
                    match message.label.channel_kind() {
                        ChannelKind::Plaintext => {
                            self.inspect_raw(&message.payload);
                        }
                        _ => {
                            self.inspect_encrypted(&message.payload);
                        }
                    }
                }
            }
        }

        self.state = PassiveState::Stopped;
        info!(
            raw_captured = self.summary.raw_captured,
            intercepted = self.summary.intercepted,
            rejected = self.summary.rejected,
            "Eavesdropper stopped"
        );
        self.summary
    }

    /// Counts so far.
    #[must_use]
    pub fn summary(&self) -> EavesdropSummary {
        self.summary
    }
}
