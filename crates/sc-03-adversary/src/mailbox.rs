//! Capture mailbox for intercepting live traffic.
//!
//! Adversaries need the most recent message on a channel, not a backlog,
//! so the mailbox is a single replaceable slot fed by a background
//! capture task. Waiters poll the slot with a predicate and a deadline.

use crate::errors::AdversaryError;
use parking_lot::Mutex;
use shared_bus::{BusMessage, Subscription};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default capture deadline.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Poll interval while waiting for a matching capture.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Single-slot mailbox holding the most recently captured message.
#[derive(Clone, Default)]
pub struct CaptureMailbox {
    slot: Arc<Mutex<Option<BusMessage>>>,
}

impl CaptureMailbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot with a newer capture.
    pub fn deposit(&self, message: BusMessage) {
        *self.slot.lock() = Some(message);
    }

    /// Take the current capture, leaving the slot empty.
    #[must_use]
    pub fn take(&self) -> Option<BusMessage> {
        self.slot.lock().take()
    }

    /// Clear any stale capture before starting a new interception.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    /// Wait until a capture satisfying `predicate` lands in the slot.
    ///
    /// Non-matching captures are discarded. Gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// `AdversaryError::CaptureTimeout` when the deadline passes without a
    /// matching capture.
    pub async fn wait_matching<F>(
        &self,
        timeout: Duration,
        predicate: F,
    ) -> Result<BusMessage, AdversaryError>
    where
        F: Fn(&BusMessage) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(message) = self.take() {
                if predicate(&message) {
                    return Ok(message);
                }
                debug!(label = %message.label, "Discarding non-matching capture");
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AdversaryError::CaptureTimeout { timeout });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

/// Spawn a background task feeding a subscription into a mailbox.
///
/// The task runs until the subscription closes or the handle is aborted.
pub fn spawn_capture_task(mut subscription: Subscription, mailbox: CaptureMailbox) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = subscription.recv().await {
            mailbox.deposit(message);
        }
        debug!("Capture task stopping: subscription closed");
    })
}
