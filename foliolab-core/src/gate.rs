//! Confidence gate — mutes low-confidence signals to `Hold`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Signal, SignalKind};
use crate::error::EngineError;

/// Minimum confidence a signal needs to keep its kind.
///
/// Always within `[MIN, MAX]`. `new` rejects out-of-range values; `clamped`
/// pulls them to the nearest bound. Callers pick which behaviour they want.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ConfidenceThreshold(f64);

impl ConfidenceThreshold {
    pub const MIN: f64 = 0.4;
    pub const MAX: f64 = 0.9;
    pub const DEFAULT: f64 = 0.6;

    pub fn new(value: f64) -> Result<Self, EngineError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(EngineError::ThresholdOutOfRange(value))
        }
    }

    /// Clamp into range. NaN maps to the default.
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for ConfidenceThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for ConfidenceThreshold {
    type Error = EngineError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConfidenceThreshold> for f64 {
    fn from(threshold: ConfidenceThreshold) -> Self {
        threshold.0
    }
}

impl fmt::Display for ConfidenceThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}

/// Pass `signal` through, or return a muted `Hold` copy when its confidence
/// is strictly below the threshold.
pub fn gate(signal: &Signal, threshold: ConfidenceThreshold) -> Signal {
    if signal.confidence < threshold.value() {
        Signal {
            kind: SignalKind::Hold,
            muted: true,
            ..signal.clone()
        }
    } else {
        signal.clone()
    }
}

/// Gate a batch of `(symbol, signal)` pairs, preserving order.
pub fn gate_all(signals: &[(String, Signal)], threshold: ConfidenceThreshold) -> Vec<(String, Signal)> {
    signals
        .iter()
        .map(|(symbol, signal)| (symbol.clone(), gate(signal, threshold)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(kind: SignalKind, confidence: f64) -> Signal {
        Signal::new(kind, confidence, Some(10), "test")
    }

    #[test]
    fn below_threshold_becomes_hold() {
        let t = ConfidenceThreshold::new(0.6).unwrap();
        let gated = gate(&signal(SignalKind::Overweight, 0.59), t);
        assert_eq!(gated.kind, SignalKind::Hold);
        assert!(gated.muted);
        assert_eq!(gated.confidence, 0.59);
        assert_eq!(gated.explanation, "test");
    }

    #[test]
    fn at_threshold_passes_through() {
        let t = ConfidenceThreshold::new(0.6).unwrap();
        let original = signal(SignalKind::Overweight, 0.6);
        let gated = gate(&original, t);
        assert_eq!(gated, original);
        assert!(!gated.muted);
    }

    #[test]
    fn new_rejects_out_of_range() {
        assert_eq!(
            ConfidenceThreshold::new(0.95),
            Err(EngineError::ThresholdOutOfRange(0.95))
        );
        assert!(ConfidenceThreshold::new(0.39).is_err());
        assert!(ConfidenceThreshold::new(f64::NAN).is_err());
        assert!(ConfidenceThreshold::new(0.4).is_ok());
        assert!(ConfidenceThreshold::new(0.9).is_ok());
    }

    #[test]
    fn clamped_pulls_to_bounds() {
        assert_eq!(ConfidenceThreshold::clamped(0.1).value(), 0.4);
        assert_eq!(ConfidenceThreshold::clamped(2.0).value(), 0.9);
        assert_eq!(ConfidenceThreshold::clamped(0.75).value(), 0.75);
        assert_eq!(ConfidenceThreshold::clamped(f64::NAN).value(), 0.6);
    }

    #[test]
    fn deserialization_enforces_range() {
        assert!(serde_json::from_str::<ConfidenceThreshold>("0.7").is_ok());
        assert!(serde_json::from_str::<ConfidenceThreshold>("1.5").is_err());
    }

    #[test]
    fn gate_all_keeps_order() {
        let t = ConfidenceThreshold::default();
        let signals = vec![
            ("A".to_string(), signal(SignalKind::Balanced, 0.8)),
            ("B".to_string(), signal(SignalKind::Underweight, 0.5)),
        ];
        let gated = gate_all(&signals, t);
        assert_eq!(gated[0].0, "A");
        assert_eq!(gated[0].1.kind, SignalKind::Balanced);
        assert_eq!(gated[1].1.kind, SignalKind::Hold);
    }
}
