//! Portfolio health score — four structural sub-scores summing to 0–100.
//!
//! Every sub-score is a pure piecewise function of the snapshot's weight
//! vector. Weights use cost value (`quantity * avg_price`); positions with
//! zero value are left out of the weight vector entirely.
//!
//! | component       | range | driver                       |
//! |-----------------|-------|------------------------------|
//! | diversification | 0–30  | number of valued holdings    |
//! | concentration   | 0–20  | largest weight               |
//! | volatility      | 0–25  | Herfindahl index + count     |
//! | drawdown        | 0–25  | combined top-3 weight        |

use serde::{Deserialize, Serialize};

use crate::domain::PortfolioSnapshot;
use crate::error::EngineError;

/// Composite score plus the diagnostics it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Sum of the four rounded sub-scores.
    pub score: u32,
    pub diversification: u32,
    pub concentration: u32,
    pub volatility: u32,
    pub drawdown: u32,
    pub total_value: f64,
    pub num_holdings: usize,
    pub largest_position_pct: u32,
    pub top3_concentration_pct: u32,
    /// Herfindahl index rounded to 4 decimals.
    pub hhi: f64,
}

/// Weight of one value-positive position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionWeight {
    pub symbol: String,
    pub value: f64,
    pub weight: f64,
}

/// Weights of every value-positive position, in snapshot order.
///
/// Returns `EmptyPortfolio` when no position has positive value.
pub fn position_weights(snapshot: &PortfolioSnapshot) -> Result<Vec<PositionWeight>, EngineError> {
    let valued: Vec<(&str, f64)> = snapshot
        .valued()
        .map(|h| (h.symbol.as_str(), h.value()))
        .collect();
    let total: f64 = valued.iter().map(|(_, v)| v).sum();
    if valued.is_empty() || total <= 0.0 {
        return Err(EngineError::EmptyPortfolio);
    }
    Ok(valued
        .into_iter()
        .map(|(symbol, value)| PositionWeight {
            symbol: symbol.to_string(),
            value,
            weight: value / total,
        })
        .collect())
}

/// Score a snapshot.
pub fn score_portfolio(snapshot: &PortfolioSnapshot) -> Result<ScoreResult, EngineError> {
    let weights = position_weights(snapshot)?;
    let total_value: f64 = weights.iter().map(|w| w.value).sum();
    let n = weights.len();

    let mut sorted: Vec<f64> = weights.iter().map(|w| w.weight).collect();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let largest = sorted[0];
    let top3: f64 = sorted.iter().take(3).sum();
    let hhi: f64 = weights.iter().map(|w| w.weight * w.weight).sum();

    let diversification = round_score(diversification_score(n));
    let concentration = round_score(concentration_score(largest));
    let volatility = round_score(volatility_score(n, hhi));
    let drawdown = round_score(drawdown_score(top3));

    Ok(ScoreResult {
        score: diversification + concentration + volatility + drawdown,
        diversification,
        concentration,
        volatility,
        drawdown,
        total_value,
        num_holdings: n,
        largest_position_pct: round_score(largest * 100.0),
        top3_concentration_pct: round_score(top3 * 100.0),
        hhi: (hhi * 10_000.0).round() / 10_000.0,
    })
}

// ─── Sub-score tables ───────────────────────────────────────────────

/// 5 points per holding up to 3, then 1.5 up to 10, then 0.5 capped at 30.
pub fn diversification_score(num_holdings: usize) -> f64 {
    let n = num_holdings as f64;
    if num_holdings <= 3 {
        n * 5.0
    } else if num_holdings <= 10 {
        15.0 + (n - 3.0) * 1.5
    } else {
        25.5 + ((n - 10.0) * 0.5).min(4.5)
    }
}

const CONCENTRATION_STEPS: [(f64, f64); 6] = [
    (0.10, 20.0),
    (0.15, 18.0),
    (0.20, 15.0),
    (0.25, 12.0),
    (0.35, 8.0),
    (0.50, 4.0),
];

const DRAWDOWN_STEPS: [(f64, f64); 6] = [
    (0.30, 25.0),
    (0.40, 22.0),
    (0.50, 18.0),
    (0.60, 14.0),
    (0.75, 10.0),
    (0.90, 5.0),
];

fn step_score(value: f64, steps: &[(f64, f64)]) -> f64 {
    steps
        .iter()
        .find(|(limit, _)| value <= *limit)
        .map_or(0.0, |(_, points)| *points)
}

pub fn concentration_score(largest_weight: f64) -> f64 {
    step_score(largest_weight, &CONCENTRATION_STEPS)
}

pub fn drawdown_score(top3_weight: f64) -> f64 {
    step_score(top3_weight, &DRAWDOWN_STEPS)
}

pub fn volatility_score(num_holdings: usize, hhi: f64) -> f64 {
    match num_holdings {
        0 | 1 => 0.0,
        2 => 5.0,
        3..=5 => 15.0 * (1.0 - ((hhi - 0.2) / 0.8).clamp(0.0, 1.0)),
        6..=10 => 10.0 + 10.0 * (1.0 - ((hhi - 0.1) / 0.4).clamp(0.0, 1.0)),
        _ => 20.0 + 5.0 * (1.0 - (hhi / 0.2).clamp(0.0, 1.0)),
    }
}

fn round_score(value: f64) -> u32 {
    value.round().max(0.0) as u32
}
