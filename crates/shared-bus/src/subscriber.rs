//! # Message Subscriber
//!
//! Defines the subscription side of the bus.

use crate::message::BusMessage;
use shared_types::RoutingLabel;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, RwLock};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("Message bus closed")]
    Closed,
}

/// Filter selecting which labels a subscription receives.
///
/// An empty label set matches everything (the monitor's wiretap mode); a
/// non-empty set matches labels exactly.
#[derive(Debug, Clone, Default)]
pub struct LabelFilter {
    /// Labels to match exactly; empty means match all.
    pub labels: Vec<RoutingLabel>,
}

impl LabelFilter {
    /// Match every label on the bus.
    #[must_use]
    pub fn all() -> Self {
        Self { labels: Vec::new() }
    }

    /// Match exactly the given labels.
    pub fn labels<I, L>(labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<RoutingLabel>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a message passes this filter.
    #[must_use]
    pub fn matches(&self, message: &BusMessage) -> bool {
        self.labels.is_empty() || self.labels.contains(&message.label)
    }

    /// Stable key describing this filter, for subscription tracking.
    #[must_use]
    pub fn key(&self) -> String {
        if self.labels.is_empty() {
            "*".to_string()
        } else {
            self.labels
                .iter()
                .map(RoutingLabel::as_str)
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

/// A subscription handle for receiving messages.
///
/// When dropped, the subscription is automatically cleaned up.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<BusMessage>,

    /// Filter for this subscription.
    filter: LabelFilter,

    /// Reference to subscription tracking (for cleanup).
    subscriptions: Arc<RwLock<HashMap<String, usize>>>,

    /// Filter key for this subscription.
    filter_key: String,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(
        receiver: broadcast::Receiver<BusMessage>,
        filter: LabelFilter,
        subscriptions: Arc<RwLock<HashMap<String, usize>>>,
        filter_key: String,
    ) -> Self {
        Self {
            receiver,
            filter,
            subscriptions,
            filter_key,
        }
    }

    /// Receive the next message that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next matching message
    /// - `None` - The channel was closed (bus dropped)
    pub async fn recv(&mut self) -> Option<BusMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Subscriber lagged, some messages dropped");
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Some(message);
            }
            // Message doesn't match filter, continue waiting
        }
    }

    /// Try to receive the next message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available and matched
    /// - `Ok(None)` - No message available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<BusMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&message) {
                return Ok(Some(message));
            }
            // Message doesn't match filter, try again
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &LabelFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Decrement subscription count
        let Ok(mut subs) = self.subscriptions.write() else {
            return;
        };
        let Some(count) = subs.get_mut(&self.filter_key) else {
            debug!(filter = %self.filter_key, "Subscription dropped");
            return;
        };

        *count = count.saturating_sub(1);
        if *count == 0 {
            subs.remove(&self.filter_key);
        }
        debug!(filter = %self.filter_key, "Subscription dropped");
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct MessageStream {
    subscription: Subscription,
}

impl MessageStream {
    /// Create a new message stream from a subscription.
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Get the filter for this stream.
    #[must_use]
    pub fn filter(&self) -> &LabelFilter {
        self.subscription.filter()
    }
}

impl Stream for MessageStream {
    type Item = BusMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // Use try_recv for non-blocking check
        match self.subscription.try_recv() {
            Ok(Some(message)) => Poll::Ready(Some(message)),
            Ok(None) => {
                // No message ready, need to wait
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}
