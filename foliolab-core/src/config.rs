//! Tunable constants for the price simulator and the rebalancing backtest.
//!
//! Every numeric knob the simulator and the backtest consult lives here, so
//! tests and configuration files target one place. Defaults reproduce the
//! reference behaviour exactly.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Synthetic price path parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of simulated days (path length).
    pub days: u32,
    /// Seed for the linear-congruential generator.
    pub seed: u64,
    /// Deterministic daily drift added to every move.
    pub drift: f64,
    /// Half-width of the uniform daily move, as a fraction. `|drift| + daily_volatility`
    /// must stay below 1 so that no move can take a price to zero.
    pub daily_volatility: f64,
    /// Weight of the market-wide factor; `1 - correlation` goes to the stock factor.
    pub correlation: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days: 60,
            seed: 12345,
            drift: 0.0002,
            daily_volatility: 0.015,
            correlation: 0.4,
        }
    }
}

impl SimulationConfig {
    pub fn with_horizon(days: u32, seed: u64) -> Self {
        Self {
            days,
            seed,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.drift.is_finite() {
            return Err(EngineError::InvalidConfig("drift must be finite".into()));
        }
        if !(self.daily_volatility.is_finite() && self.daily_volatility >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "daily_volatility must be finite and >= 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.correlation) {
            return Err(EngineError::InvalidConfig(
                "correlation must be within [0, 1]".into(),
            ));
        }
        // |total_move| <= |drift| + daily_volatility, so prices stay positive.
        if self.drift.abs() + self.daily_volatility >= 1.0 {
            return Err(EngineError::InvalidConfig(
                "|drift| + daily_volatility must be below 1".into(),
            ));
        }
        Ok(())
    }
}

/// Rebalancing rules for the active strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceConfig {
    /// Rebalancing is only considered on days strictly after this one.
    pub warmup_days: u32,
    /// Rebalance on days divisible by this interval.
    pub interval_days: u32,
    /// Weight above which a position reads as overweight.
    pub overweight_weight: f64,
    pub overweight_base_confidence: f64,
    /// Confidence gained per unit of weight above `overweight_weight`.
    pub overweight_confidence_slope: f64,
    /// Weight below which a position reads as underweight.
    pub underweight_weight: f64,
    pub underweight_confidence: f64,
    pub balanced_confidence: f64,
    /// Overweight positions are only sold down above this weight.
    pub sell_trigger_weight: f64,
    /// Cash must exceed this before any buying, and stay at or above it per buy.
    pub min_cash: f64,
    /// Largest fraction of current cash a single buy may spend.
    pub cash_deploy_fraction: f64,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            warmup_days: 5,
            interval_days: 5,
            overweight_weight: 0.20,
            overweight_base_confidence: 0.65,
            overweight_confidence_slope: 0.5,
            underweight_weight: 0.03,
            underweight_confidence: 0.55,
            balanced_confidence: 0.6,
            sell_trigger_weight: 0.25,
            min_cash: 100.0,
            cash_deploy_fraction: 0.5,
        }
    }
}

impl RebalanceConfig {
    /// Whether `day` (1-based) is a rebalancing day.
    pub fn is_rebalance_day(&self, day: u32) -> bool {
        day > self.warmup_days && day % self.interval_days == 0
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.interval_days == 0 {
            return Err(EngineError::InvalidConfig(
                "interval_days must be at least 1".into(),
            ));
        }
        let finite = [
            ("overweight_weight", self.overweight_weight),
            ("overweight_base_confidence", self.overweight_base_confidence),
            ("overweight_confidence_slope", self.overweight_confidence_slope),
            ("underweight_weight", self.underweight_weight),
            ("underweight_confidence", self.underweight_confidence),
            ("balanced_confidence", self.balanced_confidence),
            ("sell_trigger_weight", self.sell_trigger_weight),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(EngineError::InvalidConfig(format!("{name} must be finite")));
        }
        if self.underweight_weight >= self.overweight_weight {
            return Err(EngineError::InvalidConfig(
                "underweight_weight must be below overweight_weight".into(),
            ));
        }
        if !(self.cash_deploy_fraction > 0.0 && self.cash_deploy_fraction <= 1.0) {
            return Err(EngineError::InvalidConfig(
                "cash_deploy_fraction must be within (0, 1]".into(),
            ));
        }
        if !(self.min_cash.is_finite() && self.min_cash >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "min_cash must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}
