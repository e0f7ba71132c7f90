//! Runtime configuration from environment variables.

use shared_crypto::{EnvelopeNonce, SecretKey, KEY_LEN, NONCE_LEN};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Default 16-byte channel key.
pub const DEFAULT_KEY: &[u8; 16] = b"asconciphertest1";

/// Default 16-byte channel nonce.
pub const DEFAULT_NONCE: &[u8; 16] = b"asconcipher1test";

/// Default associated data bound into every envelope.
pub const DEFAULT_ASSOCIATED_DATA: &[u8] = b"ASCON";

/// Default flood burst size.
pub const DEFAULT_FLOOD_COUNT: u64 = 20;

/// Everything the testbed needs to run one session.
pub struct RuntimeConfig {
    /// Shared channel key.
    pub key: SecretKey,
    /// Shared channel nonce.
    pub nonce: EnvelopeNonce,
    /// Associated data bound into every envelope.
    pub associated_data: Vec<u8>,
    /// Gap between sensor readings.
    pub publish_interval: Duration,
    /// Messages per flood burst.
    pub flood_count: u64,
    /// Where to persist the attack log, if anywhere.
    pub attack_log_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            key: SecretKey::from_bytes(*DEFAULT_KEY),
            nonce: EnvelopeNonce::from_bytes(*DEFAULT_NONCE),
            associated_data: DEFAULT_ASSOCIATED_DATA.to_vec(),
            publish_interval: sc_01_publisher::DEFAULT_PUBLISH_INTERVAL,
            flood_count: DEFAULT_FLOOD_COUNT,
            attack_log_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `SC_*` environment variables.
    ///
    /// Malformed overrides are warned about and ignored, so a bad
    /// environment still yields a runnable testbed.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(key) = std::env::var("SC_KEY") {
            match SecretKey::from_slice(key.as_bytes()) {
                Ok(parsed) => {
                    config.key = parsed;
                    info!("Loaded channel key from environment");
                }
                Err(err) => warn!(%err, "SC_KEY must be {KEY_LEN} bytes, using default"),
            }
        }

        if let Ok(nonce) = std::env::var("SC_NONCE") {
            match EnvelopeNonce::from_slice(nonce.as_bytes()) {
                Ok(parsed) => {
                    config.nonce = parsed;
                    info!("Loaded channel nonce from environment");
                }
                Err(err) => warn!(%err, "SC_NONCE must be {NONCE_LEN} bytes, using default"),
            }
        }

        if let Ok(ad) = std::env::var("SC_ASSOCIATED_DATA") {
            config.associated_data = ad.into_bytes();
        }

        if let Ok(interval) = std::env::var("SC_PUBLISH_INTERVAL_MS") {
            match interval.parse::<u64>() {
                Ok(ms) if ms > 0 => config.publish_interval = Duration::from_millis(ms),
                _ => warn!("SC_PUBLISH_INTERVAL_MS must be a positive integer, using default"),
            }
        }

        if let Ok(count) = std::env::var("SC_FLOOD_COUNT") {
            match count.parse::<u64>() {
                Ok(n) => config.flood_count = n,
                Err(_) => warn!("SC_FLOOD_COUNT must be an integer, using default"),
            }
        }

        if let Ok(path) = std::env::var("SC_ATTACK_LOG") {
            if !path.is_empty() {
                config.attack_log_path = Some(PathBuf::from(path));
            }
        }

        config
    }
}
