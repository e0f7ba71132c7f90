//! Event classification.
//!
//! Turns an observed `(routing label, payload)` pair into an attack
//! category with fixed severity/outcome defaults. The decision table is
//! keyed on the label's `(ChannelKind, SuffixKind)` interpretation; a
//! structured `TAMPERED` marker in the payload corroborates the label
//! verdict but never overrides it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_types::{ChannelKind, RoutingLabel, SuffixKind};
use std::fmt;

/// Attack category assigned to every observed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventCategory {
    /// Legitimate clear-text reading.
    NormalPlaintext,
    /// Legitimate sealed envelope.
    NormalEncrypted,
    /// Modified clear-text reading.
    TamperPlaintext,
    /// Modified sealed envelope.
    TamperCiphertext,
    /// Resent, unmodified message.
    Replay,
    /// Flood traffic.
    DenialOfService,
    /// Nothing this system recognizes.
    Unknown,
}

impl EventCategory {
    /// Whether this category represents an attack.
    #[must_use]
    pub fn is_attack(self) -> bool {
        matches!(
            self,
            Self::TamperPlaintext | Self::TamperCiphertext | Self::Replay | Self::DenialOfService
        )
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NormalPlaintext => "normal-plaintext",
            Self::NormalEncrypted => "normal-encrypted",
            Self::TamperPlaintext => "tamper-plaintext",
            Self::TamperCiphertext => "tamper-ciphertext",
            Self::Replay => "replay",
            Self::DenialOfService => "denial-of-service",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Fixed severity level per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Not an attack.
    None,
    /// Attack attempted but contained or bounded.
    Medium,
    /// Attack with direct data impact.
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "NONE",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// Fixed attack outcome per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The attack achieved its effect.
    Successful,
    /// The envelope codec rejected the attack.
    Blocked,
    /// Ongoing (flood traffic).
    InProgress,
    /// Not applicable or not determinable.
    Unknown,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Successful => "SUCCESSFUL",
            Self::Blocked => "BLOCKED",
            Self::InProgress => "IN PROGRESS",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// A classified observation of one bus message.
///
/// Never mutated after creation; appended to the monitor's bounded
/// history.
#[derive(Debug, Clone)]
pub struct ClassifiedEvent {
    /// When the monitor observed the message.
    pub observed_at: DateTime<Utc>,
    /// The routing label it arrived on.
    pub label: RoutingLabel,
    /// Raw payload bytes as observed.
    pub raw_payload: Vec<u8>,
    /// Assigned category (exactly one).
    pub category: EventCategory,
    /// Fixed per-category severity.
    pub severity: Severity,
    /// Fixed per-category outcome.
    pub outcome: Outcome,
    /// Whether the payload carried a structured `TAMPERED` marker agreeing
    /// with the label verdict.
    pub corroborated: bool,
}

/// The fixed decision table: `(channel, suffix) -> (category, severity,
/// outcome)`.
#[must_use]
pub fn decide(channel: ChannelKind, suffix: SuffixKind) -> (EventCategory, Severity, Outcome) {
    use EventCategory as C;
    use Outcome as O;
    use Severity as S;

    match (channel, suffix) {
        (ChannelKind::Plaintext, SuffixKind::Tampered) => (C::TamperPlaintext, S::High, O::Successful),
        (ChannelKind::Encrypted, SuffixKind::Tampered) => (C::TamperCiphertext, S::Medium, O::Blocked),
        (_, SuffixKind::Replayed) => (C::Replay, S::Medium, O::Successful),
        (_, SuffixKind::Dos) => (C::DenialOfService, S::High, O::InProgress),
        (ChannelKind::Plaintext, SuffixKind::None) => (C::NormalPlaintext, S::None, O::Unknown),
        (ChannelKind::Encrypted, SuffixKind::None) => (C::NormalEncrypted, S::None, O::Unknown),
        _ => (C::Unknown, S::None, O::Unknown),
    }
}

/// Classify one observed message.
///
/// Pure function of its inputs: same label and payload always yield the
/// same category, severity, and outcome. The payload is only consulted for
/// the corroborating `TAMPERED` marker; an unparseable payload simply
/// leaves corroboration false.
#[must_use]
pub fn classify(label: &RoutingLabel, payload: &[u8]) -> ClassifiedEvent {
    let parts = label.parts();
    let (category, severity, outcome) = decide(parts.channel, parts.suffix);

    let corroborated = matches!(
        category,
        EventCategory::TamperPlaintext | EventCategory::TamperCiphertext
    ) && payload_marks_tampered(payload);

    ClassifiedEvent {
        observed_at: Utc::now(),
        label: label.clone(),
        raw_payload: payload.to_vec(),
        category,
        severity,
        outcome,
        corroborated,
    }
}

fn payload_marks_tampered(payload: &[u8]) -> bool {
    serde_json::from_slice::<serde_json::Value>(payload)
        .ok()
        .and_then(|v| v.get("TAMPERED").and_then(serde_json::Value::as_bool))
        .unwrap_or(false)
}
