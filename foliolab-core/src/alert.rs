//! Signal transition alerts between refreshes.
//!
//! The only state carried across refreshes is the previous per-symbol signal
//! map. It lives in a caller-owned `SignalHistory`; the engine keeps nothing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Signal, SignalKind, SignalMap};

/// Transition message for one symbol, or `None` when there is nothing to report.
pub fn detect_change(previous: Option<&Signal>, next: &Signal) -> Option<String> {
    let previous = previous?;
    if previous.kind == next.kind {
        return None;
    }
    Some(format!(
        "Signal changed from {} to {}",
        previous.kind, next.kind
    ))
}

/// A detected transition for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub symbol: String,
    pub from: SignalKind,
    pub to: SignalKind,
    pub message: String,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol, self.message)
    }
}

/// Alerts for `next` against `previous`, in the order of `next`.
pub fn detect_alerts(previous: &SignalMap, next: &[(String, Signal)]) -> Vec<Alert> {
    next.iter()
        .filter_map(|(symbol, signal)| {
            let prior = previous.get(symbol);
            detect_change(prior, signal).map(|message| Alert {
                symbol: symbol.clone(),
                from: prior.map_or(signal.kind, |p| p.kind),
                to: signal.kind,
                message,
            })
        })
        .collect()
}

/// Caller-owned memory of the last refresh's signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalHistory {
    previous: SignalMap,
}

impl SignalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(previous: SignalMap) -> Self {
        Self { previous }
    }

    pub fn previous(&self) -> &SignalMap {
        &self.previous
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    /// Detect alerts against the stored map, then replace it wholesale with
    /// `next`. Symbols absent from `next` are dropped, never merged.
    pub fn refresh(&mut self, next: &[(String, Signal)]) -> Vec<Alert> {
        let alerts = detect_alerts(&self.previous, next);
        self.previous = next.iter().cloned().collect();
        alerts
    }
}
