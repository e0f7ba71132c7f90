//! Sensor reading domain entity.

use crate::errors::WireError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

fn default_unit() -> String {
    "cm".to_string()
}

fn is_false(v: &bool) -> bool {
    !v
}

/// Timestamp as emitted by devices: either an ISO-8601 string or a raw
/// Unix timestamp. Both occur on the wire (synthetic flood payloads use
/// the numeric form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingTimestamp {
    /// ISO-8601 text timestamp.
    Text(String),
    /// Seconds since the Unix epoch.
    Unix(f64),
}

/// A single distance reading produced by the simulated sensor.
///
/// Field names match the device wire JSON (`id`, `count`, `distance`,
/// `unit`, `timestamp`). Immutable once published; `count` increases
/// monotonically per device in the non-adversarial case.
///
/// The optional `TAMPERED`, `FAKE`, and `attack_time` markers are written
/// by adversaries onto derived messages; decoders tolerate them and the
/// classifier treats them as corroborating signals only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Device identifier.
    pub id: String,
    /// Per-device publish sequence number.
    #[serde(default)]
    pub count: u64,
    /// Measured distance.
    pub distance: f64,
    /// Measurement unit.
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Device-side timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<ReadingTimestamp>,
    /// Set by a tampering adversary on modified copies.
    #[serde(rename = "TAMPERED", default, skip_serializing_if = "is_false")]
    pub tampered: bool,
    /// Set on synthetic flood payloads.
    #[serde(rename = "FAKE", default, skip_serializing_if = "is_false")]
    pub fake: bool,
    /// When the modification was made, ISO-8601.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack_time: Option<String>,
}

impl SensorReading {
    /// Create a fresh reading stamped with the current time.
    pub fn new(id: impl Into<String>, count: u64, distance: f64) -> Self {
        Self {
            id: id.into(),
            count,
            distance,
            unit: default_unit(),
            timestamp: Some(ReadingTimestamp::Text(Utc::now().to_rfc3339())),
            tampered: false,
            fake: false,
            attack_time: None,
        }
    }

    /// Serialize to wire JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(|e| WireError::MalformedPayload(e.to_string()))
    }

    /// Parse from wire JSON, tolerating extra fields.
    pub fn from_json(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(|e| WireError::MalformedPayload(e.to_string()))
    }
}
