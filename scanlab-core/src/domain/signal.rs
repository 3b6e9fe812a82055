//! Signal: a discrete buy/short event detected on the latest bars.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction a signal asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Short,
}

impl SignalType {
    pub fn opposite(&self) -> Self {
        match self {
            SignalType::Buy => SignalType::Short,
            SignalType::Short => SignalType::Buy,
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Buy => write!(f, "BUY"),
            SignalType::Short => write!(f, "SHORT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStrength {
    Strong,
    Medium,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalStrength::Strong => write!(f, "STRONG"),
            SignalStrength::Medium => write!(f, "MEDIUM"),
        }
    }
}

/// A detected pattern: `{type, reason, strength}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    #[serde(rename = "type")]
    pub kind: SignalType,
    pub reason: String,
    pub strength: SignalStrength,
}

impl Signal {
    pub fn new(kind: SignalType, reason: impl Into<String>, strength: SignalStrength) -> Self {
        Self {
            kind,
            reason: reason.into(),
            strength,
        }
    }
}
