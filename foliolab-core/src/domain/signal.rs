//! Allocation signals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Allocation verdict for a position or a whole portfolio.
///
/// Classifiers only ever emit the first three variants; `Hold` is produced
/// exclusively by the confidence gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    Underweight,
    Balanced,
    Overweight,
    Hold,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Underweight => "UNDERWEIGHT",
            SignalKind::Balanced => "BALANCED",
            SignalKind::Overweight => "OVERWEIGHT",
            SignalKind::Hold => "HOLD",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified signal with its confidence and a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    /// Confidence in `[0, 1]`, rounded to two decimals.
    pub confidence: f64,
    /// Observed position weight in whole percent. `None` for portfolio-level signals.
    pub weight_pct: Option<u32>,
    pub explanation: String,
    /// Set by the confidence gate when it downgraded this signal to `Hold`.
    #[serde(default)]
    pub muted: bool,
}

impl Signal {
    pub fn new(
        kind: SignalKind,
        confidence: f64,
        weight_pct: Option<u32>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            confidence,
            weight_pct,
            explanation: explanation.into(),
            muted: false,
        }
    }
}

/// Per-symbol signals from one refresh. Owned by the caller between refreshes.
pub type SignalMap = BTreeMap<String, Signal>;
