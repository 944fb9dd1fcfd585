//! Deterministic synthetic price paths.
//!
//! Each day draws one market-wide factor, then one individual factor per
//! symbol in insertion order. The combined move
//! `drift + correlation * market + (1 - correlation) * stock` compounds onto
//! the previous day's price. Draw order and operation order are fixed, so a
//! given `(prices, days, seed)` always yields the same bits.

use indexmap::IndexMap;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::domain::{DayPrices, PortfolioSnapshot, PricePath};
use crate::error::EngineError;
use crate::rng::Lcg31;

/// Day-by-day price generator with its own generator state.
///
/// `simulate` builds a fresh simulator per call. Holding on to a simulator
/// and drawing more days continues the same path.
#[derive(Debug, Clone)]
pub struct PriceSimulator {
    rng: Lcg31,
    prices: IndexMap<String, f64>,
    drift: f64,
    daily_volatility: f64,
    correlation: f64,
    day: u32,
}

impl PriceSimulator {
    /// Every starting price must be finite and strictly positive.
    pub fn new(
        starting_prices: IndexMap<String, f64>,
        config: &SimulationConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if let Some((symbol, &price)) = starting_prices
            .iter()
            .find(|(_, p)| !(p.is_finite() && **p > 0.0))
        {
            return Err(EngineError::DegeneratePrice {
                symbol: symbol.clone(),
                price,
            });
        }
        Ok(Self {
            rng: Lcg31::new(config.seed),
            prices: starting_prices,
            drift: config.drift,
            daily_volatility: config.daily_volatility,
            correlation: config.correlation,
            day: 0,
        })
    }

    /// Start every holding at its average cost, in snapshot order.
    pub fn from_snapshot(
        snapshot: &PortfolioSnapshot,
        config: &SimulationConfig,
    ) -> Result<Self, EngineError> {
        if snapshot.is_empty() {
            return Err(EngineError::EmptyPortfolio);
        }
        Self::new(starting_prices(snapshot), config)
    }

    /// Last simulated day, 0 before the first step.
    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn current_prices(&self) -> &IndexMap<String, f64> {
        &self.prices
    }

    /// Advance one day.
    pub fn step(&mut self) -> DayPrices {
        let market_move = self.rng.symmetric(self.daily_volatility);
        for price in self.prices.values_mut() {
            let stock_move = self.rng.symmetric(self.daily_volatility);
            let total_move = self.drift
                + self.correlation * market_move
                + (1.0 - self.correlation) * stock_move;
            *price *= 1.0 + total_move;
        }
        self.day += 1;
        DayPrices::new(self.day, self.prices.clone())
    }
}

impl Iterator for PriceSimulator {
    type Item = DayPrices;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.step())
    }
}

/// Starting prices for a snapshot: each holding's average cost.
pub fn starting_prices(snapshot: &PortfolioSnapshot) -> IndexMap<String, f64> {
    snapshot
        .holdings()
        .iter()
        .map(|h| (h.symbol.clone(), h.avg_price))
        .collect()
}

/// Simulate `days` days from `starting_prices` with default market constants.
pub fn simulate(
    starting_prices: &IndexMap<String, f64>,
    days: u32,
    seed: u64,
) -> Result<PricePath, EngineError> {
    simulate_with(starting_prices, &SimulationConfig::with_horizon(days, seed))
}

/// Simulate with explicit constants.
pub fn simulate_with(
    starting_prices: &IndexMap<String, f64>,
    config: &SimulationConfig,
) -> Result<PricePath, EngineError> {
    let simulator = PriceSimulator::new(starting_prices.clone(), config)?;
    debug!(
        symbols = starting_prices.len(),
        days = config.days,
        seed = config.seed,
        "simulating price path"
    );
    Ok(simulator.take(config.days as usize).collect())
}

/// Simulate a path for every holding in `snapshot`.
pub fn simulate_snapshot(
    snapshot: &PortfolioSnapshot,
    config: &SimulationConfig,
) -> Result<PricePath, EngineError> {
    if snapshot.is_empty() {
        return Err(EngineError::EmptyPortfolio);
    }
    simulate_with(&starting_prices(snapshot), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Holding;

    fn prices(pairs: &[(&str, f64)]) -> IndexMap<String, f64> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn path_has_requested_length_and_indices() {
        let path = simulate(&prices(&[("A", 100.0), ("B", 50.0)]), 60, 12345).unwrap();
        assert_eq!(path.len(), 60);
        for (i, day) in path.iter().enumerate() {
            assert_eq!(day.day, i as u32 + 1);
            assert_eq!(day.prices.len(), 2);
        }
    }

    #[test]
    fn first_day_matches_hand_computation() {
        let path = simulate(&prices(&[("A", 100.0)]), 1, 12345).unwrap();

        let mut rng = Lcg31::new(12345);
        let market = (rng.next_f64() - 0.5) * 2.0 * 0.015;
        let stock = (rng.next_f64() - 0.5) * 2.0 * 0.015;
        let expected = 100.0 * (1.0 + (0.0002 + 0.4 * market + (1.0 - 0.4) * stock));

        assert_eq!(path[0].prices["A"].to_bits(), expected.to_bits());
    }

    #[test]
    fn reproducible_bit_for_bit() {
        let start = prices(&[("A", 100.0), ("B", 50.0), ("C", 10.0)]);
        let a = simulate(&start, 60, 777).unwrap();
        let b = simulate(&start, 60, 777).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_path() {
        let start = prices(&[("A", 100.0)]);
        let a = simulate(&start, 10, 1).unwrap();
        let b = simulate(&start, 10, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn prices_carry_forward() {
        let path = simulate(&prices(&[("A", 100.0)]), 30, 12345).unwrap();
        // The daily move is bounded by drift + volatility, so consecutive days stay close.
        for w in path.windows(2) {
            let ratio = w[1].prices["A"] / w[0].prices["A"];
            assert!((ratio - 1.0).abs() <= 0.0152 + 1e-12, "ratio {ratio}");
        }
    }

    #[test]
    fn insertion_order_changes_draws() {
        let ab = simulate(&prices(&[("A", 100.0), ("B", 100.0)]), 1, 9).unwrap();
        let ba = simulate(&prices(&[("B", 100.0), ("A", 100.0)]), 1, 9).unwrap();
        assert_eq!(ab[0].prices["A"], ba[0].prices["B"]);
        assert_eq!(ab[0].prices["B"], ba[0].prices["A"]);
    }

    #[test]
    fn degenerate_price_fails_fast() {
        let err = simulate(&prices(&[("A", 100.0), ("B", 0.0)]), 10, 1).unwrap_err();
        assert_eq!(
            err,
            EngineError::DegeneratePrice {
                symbol: "B".into(),
                price: 0.0
            }
        );
        assert!(simulate(&prices(&[("A", f64::NAN)]), 10, 1).is_err());
    }

    #[test]
    fn continuation_extends_the_same_path() {
        let start = prices(&[("A", 100.0), ("B", 20.0)]);
        let full = simulate(&start, 20, 5).unwrap();

        let mut sim = PriceSimulator::new(start, &SimulationConfig::with_horizon(20, 5)).unwrap();
        let first: Vec<_> = sim.by_ref().take(12).collect();
        assert_eq!(sim.day(), 12);
        assert_eq!(sim.current_prices(), &first[11].prices);
        let rest: Vec<_> = sim.take(8).collect();

        assert_eq!(&full[..12], &first[..]);
        assert_eq!(&full[12..], &rest[..]);
    }

    #[test]
    fn snapshot_uses_avg_price_in_order() {
        let snap = PortfolioSnapshot::new(vec![
            Holding::new("X", 1.0, 10.0),
            Holding::new("Y", 0.0, 20.0),
        ])
        .unwrap();
        let start = starting_prices(&snap);
        assert_eq!(start.keys().collect::<Vec<_>>(), vec!["X", "Y"]);
        assert_eq!(simulate_snapshot(&snap, &SimulationConfig::default()).unwrap().len(), 60);
    }

    #[test]
    fn zero_days_is_empty_path() {
        assert!(simulate(&prices(&[("A", 1.0)]), 0, 1).unwrap().is_empty());
    }
}
