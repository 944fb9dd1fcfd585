//! Trade — a single rebalancing execution inside the backtest.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("BUY"),
            TradeAction::Sell => f.write_str("SELL"),
        }
    }
}

/// A whole-share trade executed at the day's simulated price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub day: u32,
    pub symbol: String,
    pub action: TradeAction,
    /// Always at least 1; fractional shares are never traded.
    pub shares: u64,
    pub price: f64,
    /// `shares * price`: proceeds for a sell, cost for a buy.
    pub value: f64,
}

impl Trade {
    pub fn new(day: u32, symbol: &str, action: TradeAction, shares: u64, price: f64) -> Self {
        Self {
            day,
            symbol: symbol.to_string(),
            action,
            shares,
            price,
            value: shares as f64 * price,
        }
    }

    pub fn is_sell(&self) -> bool {
        self.action == TradeAction::Sell
    }

    /// A sell is a win when its proceeds exceed the shares' original cost.
    pub fn is_winning_sell(&self, original_avg_price: f64) -> bool {
        self.is_sell() && self.value > self.shares as f64 * original_avg_price
    }
}
