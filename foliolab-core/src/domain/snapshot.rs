//! PortfolioSnapshot — the validated, read-only input to every engine call.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::holding::Holding;
use crate::error::EngineError;

/// Ordered holdings with unique symbols.
///
/// Constructed only through `new`, which validates every holding. Engine
/// operations borrow the snapshot and never mutate it; the backtest clones
/// what it needs into its own working book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Holding>", into = "Vec<Holding>")]
pub struct PortfolioSnapshot {
    holdings: Vec<Holding>,
}

impl PortfolioSnapshot {
    /// Validate holdings and symbol uniqueness. An empty list is accepted
    /// here; scoring and backtesting report `EmptyPortfolio` for it.
    pub fn new(holdings: Vec<Holding>) -> Result<Self, EngineError> {
        let mut seen = IndexSet::with_capacity(holdings.len());
        for holding in &holdings {
            holding.validate()?;
            if !seen.insert(holding.symbol.as_str()) {
                return Err(EngineError::DuplicateSymbol(holding.symbol.clone()));
            }
        }
        Ok(Self { holdings })
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    /// Sum of position values at cost.
    pub fn total_cost(&self) -> f64 {
        self.holdings.iter().map(Holding::value).sum()
    }

    /// Holdings whose value is strictly positive, in snapshot order.
    pub fn valued(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter().filter(|h| h.value() > 0.0)
    }
}

impl TryFrom<Vec<Holding>> for PortfolioSnapshot {
    type Error = EngineError;

    fn try_from(holdings: Vec<Holding>) -> Result<Self, Self::Error> {
        Self::new(holdings)
    }
}

impl From<PortfolioSnapshot> for Vec<Holding> {
    fn from(snapshot: PortfolioSnapshot) -> Self {
        snapshot.holdings
    }
}
