//! # Message Publisher
//!
//! Defines the publishing side of the bus.

use crate::message::BusMessage;
use crate::subscriber::{LabelFilter, MessageStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing messages to the bus.
///
/// This is the `publish(label, bytes) -> ack` half of the transport
/// contract every actor consumes.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish a message to the bus.
    ///
    /// # Returns
    ///
    /// The acknowledgment: how many active subscribers the broker
    /// delivered to. Zero means the broker accepted the message but nobody
    /// was listening.
    async fn publish(&self, message: BusMessage) -> usize;

    /// Get the total number of messages published.
    fn messages_published(&self) -> u64;
}

/// In-memory implementation of the message bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics. Suitable for single-process operation; a deployment against
/// a real broker would provide a different implementation behind the same
/// traits.
pub struct InMemoryBus {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<BusMessage>,

    /// Active subscription count by filter key.
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Total messages published.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to messages matching a filter.
    ///
    /// Returns a `Subscription` handle that can be used to receive
    /// messages.
    #[must_use]
    pub fn subscribe(&self, filter: LabelFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let filter_key = filter.key();

        // Track subscription
        {
            if let Ok(mut subs) = self.subscriptions.write() {
                *subs.entry(filter_key.clone()).or_insert(0) += 1;
            }
        }

        debug!(filter = %filter_key, "New subscription created");

        Subscription::new(receiver, filter, self.subscriptions.clone(), filter_key)
    }

    /// Get a stream of messages matching a filter.
    #[must_use]
    pub fn message_stream(&self, filter: LabelFilter) -> MessageStream {
        MessageStream::new(self.subscribe(filter))
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryBus {
    async fn publish(&self, message: BusMessage) -> usize {
        let label = message.label.clone();

        // Always increment counter (publish was attempted)
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(message) {
            Ok(receiver_count) => {
                debug!(
                    label = %label,
                    receivers = receiver_count,
                    "Message published"
                );
                receiver_count
            }
            Err(e) => {
                // No receivers - message is dropped
                warn!(
                    label = %label,
                    error = %e,
                    "Message dropped (no receivers)"
                );
                0
            }
        }
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
