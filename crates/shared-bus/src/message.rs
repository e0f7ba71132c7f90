//! Bus message type.

use chrono::{DateTime, Utc};
use shared_types::RoutingLabel;
use uuid::Uuid;

/// A single message as it travels over the bus: an opaque payload routed
/// by label. The bus does not inspect payloads; whether the bytes are a
/// clear reading, an envelope, or attack traffic is for subscribers to
/// decide.
///
/// The `id` identifies the delivery, not the content: a replayed payload
/// gets a fresh id.
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// Unique delivery identifier.
    pub id: Uuid,
    /// Routing label (channel name).
    pub label: RoutingLabel,
    /// Raw payload bytes.
    pub payload: Vec<u8>,
    /// Broker-side receive timestamp.
    pub published_at: DateTime<Utc>,
}

impl BusMessage {
    /// Create a message stamped with a fresh id and the current time.
    pub fn new(label: impl Into<RoutingLabel>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            payload: payload.into(),
            published_at: Utc::now(),
        }
    }

    /// Payload as UTF-8 text, if it is valid.
    #[must_use]
    pub fn payload_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}
