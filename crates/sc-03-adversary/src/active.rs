//! Active adversary: capture, modify, republish.
//!
//! Four attacks, all label-honest by testbed convention: every derived
//! message goes out on the victim label plus its attack suffix, so the
//! monitor can classify deliveries without inspecting payloads.
//!
//! - plaintext tamper: forge the distance on an intercepted clear reading
//! - ciphertext tamper: flip bytes inside an intercepted envelope
//! - replay: resend an intercepted envelope byte-identical
//! - flood: publish bursts of synthetic readings

use crate::errors::AdversaryError;
use crate::mailbox::{spawn_capture_task, CaptureMailbox, DEFAULT_CAPTURE_TIMEOUT};
use shared_bus::{BusMessage, InMemoryBus, LabelFilter, MessagePublisher};
use shared_crypto::{open, EnvelopeNonce, SecretKey};
use shared_types::label::{ENC_CHANNEL, RAW_CHANNEL};
use shared_types::{AttackSuffix, EnvelopeWire, RoutingLabel, SensorReading};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Forged distance written by the plaintext tamper attack.
pub const SENTINEL_DISTANCE: f64 = 999.0;

/// XOR mask applied to the first ciphertext byte.
pub const FLIP_FIRST_MASK: u8 = 0xFF;

/// XOR mask applied to the sixth ciphertext byte.
pub const FLIP_SECOND_MASK: u8 = 0xAA;

/// Gap between consecutive flood publishes.
const FLOOD_INTERVAL: Duration = Duration::from_millis(50);

/// Result of a plaintext tamper.
#[derive(Debug, Clone)]
pub struct PlaintextTamper {
    /// The reading as intercepted.
    pub original: SensorReading,
    /// The reading as republished.
    pub forged: SensorReading,
    /// Subscribers the forged message reached.
    pub acks: usize,
}

/// Result of a ciphertext tamper.
#[derive(Debug, Clone)]
pub struct CiphertextTamper {
    /// Ciphertext as intercepted.
    pub original_ciphertext: Vec<u8>,
    /// Ciphertext as republished, bytes 0 and 5 flipped.
    pub flipped_ciphertext: Vec<u8>,
    /// Subscribers the flipped message reached.
    pub acks: usize,
}

/// Result of a replay.
#[derive(Debug, Clone)]
pub struct Replay {
    /// The envelope bytes resent unmodified.
    pub payload: Vec<u8>,
    /// Subscribers the replayed message reached.
    pub acks: usize,
}

/// Result of a flood burst.
#[derive(Debug, Clone, Copy)]
pub struct FloodSummary {
    /// Messages published.
    pub sent: u64,
    /// Publishes that reached at least one subscriber.
    pub acked: u64,
}

/// Capturing, modifying, republishing adversary.
///
/// Holds one capture mailbox per victim channel, each fed by a
/// background task, so attacks can intercept whatever traffic is live
/// when they run.
pub struct ActiveAdversary {
    bus: Arc<InMemoryBus>,
    raw_mailbox: CaptureMailbox,
    enc_mailbox: CaptureMailbox,
    capture_tasks: Vec<JoinHandle<()>>,
    capture_timeout: Duration,
}

impl ActiveAdversary {
    /// Start capturing on both victim channels.
    #[must_use]
    pub fn new(bus: Arc<InMemoryBus>) -> Self {
        let raw_mailbox = CaptureMailbox::new();
        let enc_mailbox = CaptureMailbox::new();
        let capture_tasks = vec![
            spawn_capture_task(
                bus.subscribe(LabelFilter::labels([RAW_CHANNEL])),
                raw_mailbox.clone(),
            ),
            spawn_capture_task(
                bus.subscribe(LabelFilter::labels([ENC_CHANNEL])),
                enc_mailbox.clone(),
            ),
        ];
        Self {
            bus,
            raw_mailbox,
            enc_mailbox,
            capture_tasks,
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }

    /// Override the capture deadline; tests use short ones.
    #[must_use]
    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = timeout;
        self
    }

    /// Intercept a clear reading, forge its distance to the sentinel
    /// value, mark it, and republish on the tampered label.
    ///
    /// # Errors
    ///
    /// - `CaptureTimeout` if no clear reading arrives in time
    /// - `Wire` if the intercepted payload is not a reading
    /// - `NoSubscribers` if nobody received the forgery
    pub async fn tamper_plaintext(&self) -> Result<PlaintextTamper, AdversaryError> {
        self.raw_mailbox.clear();
        let captured = self
            .raw_mailbox
            .wait_matching(self.capture_timeout, |_| true)
            .await?;
        let original = SensorReading::from_json(&captured.payload)?;

        let mut forged = original.clone();
        forged.distance = SENTINEL_DISTANCE;
        forged.tampered = true;
        forged.attack_time = Some(chrono::Utc::now().to_rfc3339());

        let label = RoutingLabel::new(RAW_CHANNEL).derived(AttackSuffix::Tampered);
        let acks = self.republish(label, forged.to_json()?).await?;
        info!(
            original = original.distance,
            forged = forged.distance,
            acks,
            "Plaintext tamper republished"
        );
        Ok(PlaintextTamper { original, forged, acks })
    }

    /// Intercept an envelope, flip ciphertext bytes 0 and 5, mark it,
    /// and republish on the tampered label. The tag no longer verifies,
    /// so receivers holding the real key must reject it.
    ///
    /// # Errors
    ///
    /// - `CaptureTimeout` if no envelope arrives in time
    /// - `Wire` if the intercepted payload is not a parseable envelope
    /// - `NoSubscribers` if nobody received the flipped envelope
    pub async fn tamper_ciphertext(&self) -> Result<CiphertextTamper, AdversaryError> {
        self.enc_mailbox.clear();
        let captured = self
            .enc_mailbox
            .wait_matching(self.capture_timeout, |_| true)
            .await?;
        let mut envelope = EnvelopeWire::decode(&captured.payload)?;
        let original_ciphertext = envelope.ciphertext()?;

        let flipped_ciphertext = flip_ciphertext(&original_ciphertext);
        envelope.set_ciphertext(&flipped_ciphertext);
        envelope.tampered = true;

        let label = RoutingLabel::new(ENC_CHANNEL).derived(AttackSuffix::Tampered);
        let acks = self.republish(label, envelope.encode()?).await?;
        info!(bytes = flipped_ciphertext.len(), acks, "Ciphertext tamper republished");
        Ok(CiphertextTamper {
            original_ciphertext,
            flipped_ciphertext,
            acks,
        })
    }

    /// Intercept an envelope and resend it byte-identical on the
    /// replayed label.
    ///
    /// # Errors
    ///
    /// - `CaptureTimeout` if no envelope arrives in time
    /// - `NoSubscribers` if nobody received the replay
    pub async fn replay(&self) -> Result<Replay, AdversaryError> {
        self.enc_mailbox.clear();
        let captured = self
            .enc_mailbox
            .wait_matching(self.capture_timeout, |_| true)
            .await?;

        let label = RoutingLabel::new(ENC_CHANNEL).derived(AttackSuffix::Replayed);
        let acks = self.republish(label, captured.payload.clone()).await?;
        info!(bytes = captured.payload.len(), acks, "Envelope replayed");
        Ok(Replay {
            payload: captured.payload,
            acks,
        })
    }

    /// Publish a burst of synthetic readings on the flood label.
    ///
    /// Unlike the capture attacks, flooding fabricates traffic, so it
    /// never waits on the victim and never fails on empty channels.
    pub async fn flood(&self, count: u64) -> FloodSummary {
        let label = RoutingLabel::new(RAW_CHANNEL).derived(AttackSuffix::Dos);
        let mut summary = FloodSummary { sent: 0, acked: 0 };

        for i in 0..count {
            let mut reading = SensorReading::new("FLOOD", i, SENTINEL_DISTANCE);
            reading.fake = true;
            reading.attack_time = Some(chrono::Utc::now().to_rfc3339());

            let Ok(payload) = reading.to_json() else {
                continue;
            };
            let acks = self
                .bus
                .publish(BusMessage::new(label.clone(), payload))
                .await;
            summary.sent += 1;
            if acks > 0 {
                summary.acked += 1;
            }
            tokio::time::sleep(FLOOD_INTERVAL).await;
        }

        info!(sent = summary.sent, acked = summary.acked, "Flood burst complete");
        summary
    }

    async fn republish(
        &self,
        label: RoutingLabel,
        payload: Vec<u8>,
    ) -> Result<usize, AdversaryError> {
        let label_text = label.to_string();
        let acks = self.bus.publish(BusMessage::new(label, payload)).await;
        if acks == 0 {
            warn!(label = %label_text, "Republished message reached nobody");
            return Err(AdversaryError::NoSubscribers { label: label_text });
        }
        Ok(acks)
    }
}

impl Drop for ActiveAdversary {
    fn drop(&mut self) {
        for task in &self.capture_tasks {
            task.abort();
        }
    }
}

/// Flip the attack's two fixed byte positions.
///
/// Position 0 always exists (ciphertexts carry at least the 16-byte tag);
/// position 5 is flipped when present.
#[must_use]
pub fn flip_ciphertext(ciphertext: &[u8]) -> Vec<u8> {
    let mut flipped = ciphertext.to_vec();
    if let Some(first) = flipped.first_mut() {
        *first ^= FLIP_FIRST_MASK;
    }
    if let Some(sixth) = flipped.get_mut(5) {
        *sixth ^= FLIP_SECOND_MASK;
    }
    flipped
}

/// Confirm a flipped ciphertext is rejected under the real channel
/// secrets. Run by the testbed after a ciphertext tamper.
///
/// # Errors
///
/// `AdversaryError::TamperNotDetected` if the flipped ciphertext still
/// decrypts.
pub fn verify_tamper_blocked(
    flipped_ciphertext: &[u8],
    key: &SecretKey,
    nonce: &EnvelopeNonce,
    associated_data: &[u8],
) -> Result<(), AdversaryError> {
    match open(flipped_ciphertext, key, nonce, associated_data) {
        Err(_) => Ok(()),
        Ok(_) => Err(AdversaryError::TamperNotDetected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::LabelFilter;
    use shared_crypto::seal;

    const KEY: &[u8; 16] = b"asconciphertest1";
    const NONCE: &[u8; 16] = b"asconcipher1test";
    const AD: &[u8] = b"ASCON";

    fn secrets() -> (SecretKey, EnvelopeNonce) {
        (SecretKey::from_bytes(*KEY), EnvelopeNonce::from_bytes(*NONCE))
    }

    fn sealed_payload(plaintext: &[u8]) -> Vec<u8> {
        let (key, nonce) = secrets();
        let sealed = seal(plaintext, &key, &nonce, AD).unwrap();
        EnvelopeWire::from_ciphertext(&sealed.ciphertext, sealed.algorithm)
            .encode()
            .unwrap()
    }

    #[test]
    fn test_flip_changes_expected_positions() {
        let ciphertext = vec![0u8; 20];
        let flipped = flip_ciphertext(&ciphertext);
        assert_eq!(flipped[0], 0xFF);
        assert_eq!(flipped[5], 0xAA);
        for (i, byte) in flipped.iter().enumerate() {
            if i != 0 && i != 5 {
                assert_eq!(*byte, 0);
            }
        }
    }

    #[test]
    fn test_verify_tamper_blocked() {
        let (key, nonce) = secrets();
        let sealed = seal(b"distance reading", &key, &nonce, AD).unwrap();
        let flipped = flip_ciphertext(&sealed.ciphertext);

        assert!(verify_tamper_blocked(&flipped, &key, &nonce, AD).is_ok());
        // Unmodified ciphertext still decrypts, so verification reports it.
        assert!(matches!(
            verify_tamper_blocked(&sealed.ciphertext, &key, &nonce, AD),
            Err(AdversaryError::TamperNotDetected)
        ));
    }

    #[tokio::test]
    async fn test_tamper_plaintext_forges_sentinel() {
        let bus = Arc::new(InMemoryBus::new());
        let adversary = ActiveAdversary::new(Arc::clone(&bus))
            .with_capture_timeout(Duration::from_secs(2));
        let mut victim_feed = bus.subscribe(LabelFilter::labels([
            "iot/sensor/distance/raw/tampered",
        ]));

        // Give the capture tasks time to subscribe, then emit victim traffic.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let reading = SensorReading::new("S1", 3, 25.4);
        bus.publish(BusMessage::new(RAW_CHANNEL, reading.to_json().unwrap()))
            .await;

        let outcome = adversary.tamper_plaintext().await.unwrap();
        assert_eq!(outcome.original.distance, 25.4);
        assert_eq!(outcome.forged.distance, SENTINEL_DISTANCE);
        assert!(outcome.forged.tampered);
        assert!(outcome.forged.attack_time.is_some());

        let delivered = tokio::time::timeout(Duration::from_secs(2), victim_feed.recv())
            .await
            .unwrap()
            .unwrap();
        let forged = SensorReading::from_json(&delivered.payload).unwrap();
        assert_eq!(forged.distance, SENTINEL_DISTANCE);
    }

    #[tokio::test]
    async fn test_tamper_ciphertext_breaks_authentication() {
        let bus = Arc::new(InMemoryBus::new());
        let adversary = ActiveAdversary::new(Arc::clone(&bus))
            .with_capture_timeout(Duration::from_secs(2));
        let mut victim_feed = bus.subscribe(LabelFilter::labels([
            "iot/sensor/distance/enc/tampered",
        ]));

        tokio::time::sleep(Duration::from_millis(50)).await;
        bus.publish(BusMessage::new(ENC_CHANNEL, sealed_payload(b"reading"))).await;

        let outcome = adversary.tamper_ciphertext().await.unwrap();
        assert_ne!(outcome.flipped_ciphertext, outcome.original_ciphertext);

        let (key, nonce) = secrets();
        assert!(verify_tamper_blocked(&outcome.flipped_ciphertext, &key, &nonce, AD).is_ok());

        let delivered = tokio::time::timeout(Duration::from_secs(2), victim_feed.recv())
            .await
            .unwrap()
            .unwrap();
        let envelope = EnvelopeWire::decode(&delivered.payload).unwrap();
        assert!(envelope.tampered);
        assert_eq!(envelope.ciphertext().unwrap(), outcome.flipped_ciphertext);
    }

    #[tokio::test]
    async fn test_replay_resends_identical_bytes() {
        let bus = Arc::new(InMemoryBus::new());
        let adversary = ActiveAdversary::new(Arc::clone(&bus))
            .with_capture_timeout(Duration::from_secs(2));
        let mut victim_feed = bus.subscribe(LabelFilter::labels([
            "iot/sensor/distance/enc/replayed",
        ]));

        tokio::time::sleep(Duration::from_millis(50)).await;
        let payload = sealed_payload(b"reading");
        bus.publish(BusMessage::new(ENC_CHANNEL, payload.clone())).await;

        let outcome = adversary.replay().await.unwrap();
        assert_eq!(outcome.payload, payload);

        let delivered = tokio::time::timeout(Duration::from_secs(2), victim_feed.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivered.payload, payload);
    }

    #[tokio::test]
    async fn test_capture_timeout_when_channel_silent() {
        let bus = Arc::new(InMemoryBus::new());
        let adversary = ActiveAdversary::new(Arc::clone(&bus))
            .with_capture_timeout(Duration::from_millis(100));

        let result = adversary.replay().await;
        assert!(matches!(result, Err(AdversaryError::CaptureTimeout { .. })));
    }

    #[tokio::test]
    async fn test_flood_publishes_marked_fakes() {
        let bus = Arc::new(InMemoryBus::new());
        let adversary = ActiveAdversary::new(Arc::clone(&bus));
        let mut victim_feed =
            bus.subscribe(LabelFilter::labels(["iot/sensor/distance/raw/dos"]));

        let summary = adversary.flood(3).await;
        assert_eq!(summary.sent, 3);
        assert_eq!(summary.acked, 3);

        for _ in 0..3 {
            let delivered = tokio::time::timeout(Duration::from_secs(2), victim_feed.recv())
                .await
                .unwrap()
                .unwrap();
            let reading = SensorReading::from_json(&delivered.payload).unwrap();
            assert!(reading.fake);
            assert_eq!(reading.distance, SENTINEL_DISTANCE);
        }
    }
}
