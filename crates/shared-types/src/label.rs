//! Routing labels and their structured interpretation.
//!
//! A label is an opaque string used to route a message on the shared bus.
//! By convention adversaries republish derived messages on
//! `<base>/tampered`, `<base>/replayed`, and `<base>/dos`; the monitor's
//! classifier relies on this convention as a *hint* and corroborates it
//! against payload content where available.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base channel for clear-text sensor readings.
pub const RAW_CHANNEL: &str = "iot/sensor/distance/raw";
/// Base channel for authenticated-encrypted envelopes.
pub const ENC_CHANNEL: &str = "iot/sensor/distance/enc";

/// Suffix segment marking a modified message.
pub const TAMPERED_SEGMENT: &str = "tampered";
/// Suffix segment marking a resent message.
pub const REPLAYED_SEGMENT: &str = "replayed";
/// Suffix segment marking flood traffic.
pub const DOS_SEGMENT: &str = "dos";

/// Opaque routing label (channel name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingLabel(String);

impl RoutingLabel {
    /// Create a label from any string.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the attack label `<self>/<suffix>`.
    #[must_use]
    pub fn derived(&self, suffix: AttackSuffix) -> Self {
        Self(format!("{}/{}", self.0, suffix.segment()))
    }

    /// Split the label into its base channel and recognized attack suffix.
    #[must_use]
    pub fn parts(&self) -> LabelParts {
        let (base, suffix) = match self.0.rsplit_once('/') {
            Some((base, TAMPERED_SEGMENT)) => (base, SuffixKind::Tampered),
            Some((base, REPLAYED_SEGMENT)) => (base, SuffixKind::Replayed),
            Some((base, DOS_SEGMENT)) => (base, SuffixKind::Dos),
            _ => (self.0.as_str(), SuffixKind::None),
        };

        let channel = if base.ends_with("/raw") {
            ChannelKind::Plaintext
        } else if base.ends_with("/enc") {
            ChannelKind::Encrypted
        } else {
            ChannelKind::Unknown
        };

        LabelParts { channel, suffix }
    }

    /// Channel kind of the base label.
    #[must_use]
    pub fn channel_kind(&self) -> ChannelKind {
        self.parts().channel
    }

    /// Recognized attack suffix, if any.
    #[must_use]
    pub fn suffix_kind(&self) -> SuffixKind {
        self.parts().suffix
    }
}

impl fmt::Display for RoutingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoutingLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RoutingLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The kind of base channel a label routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Clear-text sensor readings.
    Plaintext,
    /// Authenticated-encrypted envelopes.
    Encrypted,
    /// Not a channel this system publishes on.
    Unknown,
}

/// Recognized attack-lineage suffix on a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixKind {
    /// No recognized suffix.
    None,
    /// `<base>/tampered`: modified in transit.
    Tampered,
    /// `<base>/replayed`: resent unmodified.
    Replayed,
    /// `<base>/dos`: flood traffic.
    Dos,
}

/// Structured interpretation of a routing label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelParts {
    /// Kind of the base channel.
    pub channel: ChannelKind,
    /// Recognized suffix, if any.
    pub suffix: SuffixKind,
}

/// Suffix an adversary appends when republishing a derived message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackSuffix {
    /// Message bytes were modified.
    Tampered,
    /// Message bytes were resent unmodified.
    Replayed,
    /// Synthetic flood traffic.
    Dos,
}

impl AttackSuffix {
    /// The label segment for this suffix.
    #[must_use]
    pub fn segment(self) -> &'static str {
        match self {
            Self::Tampered => TAMPERED_SEGMENT,
            Self::Replayed => REPLAYED_SEGMENT,
            Self::Dos => DOS_SEGMENT,
        }
    }
}
