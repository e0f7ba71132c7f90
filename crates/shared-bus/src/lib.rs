//! # Shared Bus - Publish/Subscribe Transport
//!
//! In-memory message bus standing in for the external broker. Every actor
//! in the testbed (publisher, subscriber, monitor, adversaries) is an
//! independent client of this bus.
//!
//! ## Contract
//!
//! - `publish(label, bytes)` returns an acknowledgment: the number of
//!   active subscribers the broker delivered to. An ack only means the
//!   broker accepted the message, not that any subscriber processed it.
//! - Delivery is at-least-once visible to all attached subscribers whose
//!   filter matches the label; a lagging subscriber may drop old messages.
//! - Message delivery happens on the receiving task, separate from the
//!   publisher's control flow.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Publisher   │                    │   Monitor    │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Message Bus  │ ─────────┘
//!                  │              │  subscribe()
//!                  └──────────────┘
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod message;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use message::BusMessage;
pub use publisher::{InMemoryBus, MessagePublisher};
pub use subscriber::{LabelFilter, MessageStream, Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before lag-dropping.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
