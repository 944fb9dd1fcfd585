//! Signal classification — position-level and portfolio-level allocation verdicts.
//!
//! Position thresholds scale with the number of holdings around an
//! equal-weight target. Portfolio verdicts read the composite health score.
//! Confidences are capped and then rounded to two decimals. Classifiers
//! never emit `Hold`; only the confidence gate does.

use crate::domain::{Holding, PortfolioSnapshot, Signal, SignalKind};
use crate::error::EngineError;
use crate::score::ScoreResult;

/// Weight bands used to classify one position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionBands {
    pub target_weight: f64,
    pub overweight: f64,
    pub underweight: f64,
}

impl PositionBands {
    pub fn for_holdings(num_holdings: usize) -> Self {
        let target_weight = 1.0 / num_holdings as f64;
        Self {
            target_weight,
            overweight: (target_weight * 2.5).max(0.15),
            underweight: (target_weight * 0.4).min(0.05),
        }
    }
}

/// Classify one holding against the portfolio's total value.
pub fn classify_position(
    holding: &Holding,
    total_value: f64,
    num_holdings: usize,
) -> Result<Signal, EngineError> {
    if num_holdings == 0 || total_value.is_nan() || total_value <= 0.0 {
        return Err(EngineError::EmptyPortfolio);
    }

    let weight = holding.value() / total_value;
    let weight_pct = pct(weight);
    let bands = PositionBands::for_holdings(num_holdings);

    if weight > bands.overweight {
        let confidence = (0.5 + (weight / bands.overweight) * 0.15).min(0.95);
        return Ok(Signal::new(
            SignalKind::Overweight,
            round_confidence(confidence),
            Some(weight_pct),
            format!(
                "Position is {weight_pct}% of portfolio (threshold: {}%).",
                pct(bands.overweight)
            ),
        ));
    }

    if weight < bands.underweight {
        let deficit_ratio = bands.underweight / weight.max(0.001);
        let confidence = (0.45 + deficit_ratio * 0.10).min(0.90);
        return Ok(Signal::new(
            SignalKind::Underweight,
            round_confidence(confidence),
            Some(weight_pct),
            format!(
                "Position is only {weight_pct}% of portfolio (threshold: {}%).",
                pct(bands.underweight)
            ),
        ));
    }

    let midpoint = (bands.overweight + bands.underweight) / 2.0;
    let range = (bands.overweight - bands.underweight) / 2.0;
    let centeredness = 1.0 - (weight - midpoint).abs() / range;
    let confidence = 0.45 + centeredness * 0.35;

    Ok(Signal::new(
        SignalKind::Balanced,
        round_confidence(confidence),
        Some(weight_pct),
        format!(
            "Position is {weight_pct}% of portfolio, within the {}%-{}% balanced band.",
            pct(bands.underweight),
            pct(bands.overweight)
        ),
    ))
}

/// Classify every holding of a scored snapshot, in snapshot order.
///
/// Zero-value holdings are included and read as underweight.
pub fn classify_positions(
    snapshot: &PortfolioSnapshot,
    score: &ScoreResult,
) -> Result<Vec<(String, Signal)>, EngineError> {
    snapshot
        .holdings()
        .iter()
        .map(|h| {
            classify_position(h, score.total_value, score.num_holdings)
                .map(|signal| (h.symbol.clone(), signal))
        })
        .collect()
}

/// Portfolio-level verdict from the composite score.
pub fn classify_portfolio(result: &ScoreResult) -> Signal {
    let score = result.score as f64;
    let largest = result.largest_position_pct as f64;

    if result.score >= 70 {
        let holdings_bonus = (result.num_holdings as f64 / 20.0).min(0.15);
        let concentration_bonus = ((30.0 - largest) / 100.0).max(0.0);
        let confidence = (0.55 + holdings_bonus + concentration_bonus).min(0.95);
        return Signal::new(
            SignalKind::Balanced,
            round_confidence(confidence),
            None,
            format!(
                "Portfolio is well-diversified with {} holdings. Largest position is {}%.",
                result.num_holdings, result.largest_position_pct
            ),
        );
    }

    if result.score >= 40 {
        let distance_from_good = (70.0 - score) / 30.0;
        let distance_from_bad = (score - 40.0) / 30.0;
        let clarity = (distance_from_good - distance_from_bad).abs();
        return Signal::new(
            SignalKind::Balanced,
            round_confidence(0.45 + clarity * 0.25),
            None,
            format!(
                "Portfolio has moderate diversification. Top 3 holdings represent {}%.",
                result.top3_concentration_pct
            ),
        );
    }

    let severity_bonus = ((40.0 - score) / 40.0).min(0.3);
    let concentration_bonus = (largest / 100.0).min(0.2);
    let confidence = (0.5 + severity_bonus + concentration_bonus).min(0.95);
    Signal::new(
        SignalKind::Overweight,
        round_confidence(confidence),
        None,
        format!(
            "Portfolio shows high concentration risk. Largest position is {}% - consider rebalancing.",
            result.largest_position_pct
        ),
    )
}

/// Round to two decimals.
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 100.0).round() / 100.0
}

fn pct(fraction: f64) -> u32 {
    (fraction * 100.0).round().max(0.0) as u32
}
