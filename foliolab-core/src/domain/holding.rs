//! Holding — one line of a portfolio snapshot.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A single position: symbol, share count, and average cost per share.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub quantity: f64,
    pub avg_price: f64,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, quantity: f64, avg_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            avg_price,
        }
    }

    /// Position value at cost: `quantity * avg_price`.
    pub fn value(&self) -> f64 {
        self.quantity * self.avg_price
    }

    /// Reject empty symbols and non-finite or negative numbers.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.symbol.trim().is_empty() {
            return Err(EngineError::invalid_holding(&self.symbol, "empty symbol"));
        }
        check_field(&self.symbol, "quantity", self.quantity)?;
        check_field(&self.symbol, "avg_price", self.avg_price)
    }
}

fn check_field(symbol: &str, field: &str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(EngineError::invalid_holding(
            symbol,
            format!("{field} is not a finite number"),
        ));
    }
    if value < 0.0 {
        return Err(EngineError::invalid_holding(
            symbol,
            format!("negative {field} {value}"),
        ));
    }
    Ok(())
}
