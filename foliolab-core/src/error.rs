//! Engine error taxonomy.
//!
//! Structural and input problems surface as `EngineError`. A symbol missing
//! from one day's price map is not an error: the backtest skips it for that
//! day and counts the gap in `BacktestResult::missing_price_days`.

use thiserror::Error;

/// Errors returned by the engine's fallible operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("portfolio has no value-positive holdings")]
    EmptyPortfolio,

    #[error("invalid holding '{symbol}': {reason}")]
    InvalidHolding { symbol: String, reason: String },

    #[error("duplicate symbol '{0}' in snapshot")]
    DuplicateSymbol(String),

    #[error("degenerate starting price {price} for '{symbol}' (must be finite and > 0)")]
    DegeneratePrice { symbol: String, price: f64 },

    #[error("confidence threshold {0} outside [0.4, 0.9]")]
    ThresholdOutOfRange(f64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub(crate) fn invalid_holding(symbol: &str, reason: impl Into<String>) -> Self {
        Self::InvalidHolding {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}
