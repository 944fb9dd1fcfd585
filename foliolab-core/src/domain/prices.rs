//! Daily price maps and simulated price paths.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prices for every simulated symbol on one day.
///
/// The map keeps symbol insertion order, which is also the order the
/// simulator drew each symbol's individual factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPrices {
    /// 1-based day index.
    pub day: u32,
    pub prices: IndexMap<String, f64>,
}

impl DayPrices {
    pub fn new(day: u32, prices: IndexMap<String, f64>) -> Self {
        Self { day, prices }
    }

    /// A usable price for `symbol`: present, finite, and strictly positive.
    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.prices
            .get(symbol)
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
    }
}

/// Ordered sequence of days, indices consecutive from 1.
pub type PricePath = Vec<DayPrices>;
