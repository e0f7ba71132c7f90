//! Time-bounded replay window.
//!
//! Optional freshness checking for ciphertext traffic. The window tracks
//! fingerprints of recently seen ciphertexts so that a byte-identical
//! re-publication inside the validity window can be flagged. This is a
//! heuristic side channel for operators; the classifier's label-derived
//! verdicts are never altered by it.
//!
//! Fingerprints are garbage-collected once they age out, bounding memory.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Errors from freshness checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FreshnessError {
    /// The exact ciphertext has already been seen (possible replay).
    #[error("Ciphertext fingerprint {fingerprint:#018x} has already been seen")]
    CiphertextReused { fingerprint: u64 },

    /// The message timestamp is too old.
    #[error("Message timestamp {timestamp} is too old (threshold: {threshold})")]
    MessageTooOld { timestamp: u64, threshold: u64 },

    /// The message timestamp is in the future.
    #[error("Message timestamp {timestamp} is in the future (threshold: {threshold})")]
    MessageFromFuture { timestamp: u64, threshold: u64 },
}

/// Time-bounded replay window over ciphertext fingerprints.
///
/// - Timestamp window: now - 60s to now + 10s
/// - Fingerprint validity: 120s (2x the timestamp window)
/// - Garbage collection: every 10s
pub struct ReplayWindow {
    /// Map of ciphertext fingerprint -> timestamp when first seen.
    seen: HashMap<u64, u64>,

    /// Fingerprint validity window in seconds.
    validity_window_secs: u64,

    /// Last garbage collection timestamp.
    last_gc: u64,

    /// Garbage collection interval in seconds.
    gc_interval_secs: u64,
}

impl ReplayWindow {
    /// Default validity window: 2x the 60s message window.
    pub const DEFAULT_VALIDITY_WINDOW: u64 = 120;

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: u64 = 10;

    /// Maximum past age for valid timestamps.
    pub const MAX_AGE: u64 = 60;

    /// Maximum future skew for valid timestamps.
    pub const MAX_FUTURE_SKEW: u64 = 10;

    /// Create a replay window with default settings.
    #[must_use]
    pub fn new() -> Self {
        let now = Self::current_timestamp();
        Self {
            seen: HashMap::new(),
            validity_window_secs: Self::DEFAULT_VALIDITY_WINDOW,
            last_gc: now,
            gc_interval_secs: Self::DEFAULT_GC_INTERVAL,
        }
    }

    /// Create a replay window with custom settings.
    #[must_use]
    pub fn with_config(validity_window_secs: u64, gc_interval_secs: u64) -> Self {
        let now = Self::current_timestamp();
        Self {
            seen: HashMap::new(),
            validity_window_secs,
            last_gc: now,
            gc_interval_secs,
        }
    }

    /// Validate timestamp and check/add the ciphertext fingerprint.
    ///
    /// The timestamp check runs first so that stale messages never touch
    /// the fingerprint map.
    ///
    /// # Errors
    ///
    /// - `FreshnessError::MessageTooOld` - timestamp older than 60s
    /// - `FreshnessError::MessageFromFuture` - timestamp more than 10s ahead
    /// - `FreshnessError::CiphertextReused` - fingerprint seen before
    pub fn check_and_remember(
        &mut self,
        ciphertext: &[u8],
        timestamp: u64,
    ) -> Result<(), FreshnessError> {
        let now = Self::current_timestamp();

        let min_valid_timestamp = now.saturating_sub(Self::MAX_AGE);
        let max_valid_timestamp = now.saturating_add(Self::MAX_FUTURE_SKEW);

        if timestamp < min_valid_timestamp {
            return Err(FreshnessError::MessageTooOld {
                timestamp,
                threshold: min_valid_timestamp,
            });
        }

        if timestamp > max_valid_timestamp {
            return Err(FreshnessError::MessageFromFuture {
                timestamp,
                threshold: max_valid_timestamp,
            });
        }

        if now.saturating_sub(self.last_gc) > self.gc_interval_secs {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        let fingerprint = Self::fingerprint(ciphertext);
        if self.seen.contains_key(&fingerprint) {
            return Err(FreshnessError::CiphertextReused { fingerprint });
        }

        self.seen.insert(fingerprint, timestamp);

        Ok(())
    }

    /// Check whether a ciphertext has been seen without remembering it.
    #[must_use]
    pub fn contains(&self, ciphertext: &[u8]) -> bool {
        self.seen.contains_key(&Self::fingerprint(ciphertext))
    }

    /// Number of remembered fingerprints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    /// Remove expired fingerprints.
    fn garbage_collect(&mut self, now: u64) {
        let expiry_threshold = now.saturating_sub(self.validity_window_secs);
        self.seen.retain(|_, &mut ts| ts > expiry_threshold);
    }

    fn fingerprint(ciphertext: &[u8]) -> u64 {
        let mut hasher = DefaultHasher::new();
        ciphertext.hash(&mut hasher);
        hasher.finish()
    }

    fn current_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl Default for ReplayWindow {
    fn default() -> Self {
        Self::new()
    }
}
