//! Equity curve metrics — pure functions, curve and/or trade list in, scalar out.

use indexmap::IndexMap;

use crate::domain::Trade;

/// Largest peak-to-trough decline as a positive fraction of the running peak.
///
/// The peak starts at the first value; a zero peak contributes no drawdown.
/// Returns 0.0 for empty or monotonically non-decreasing curves.
pub fn max_drawdown(curve: &[f64]) -> f64 {
    let mut peak = curve.first().copied().unwrap_or(0.0);
    let mut max_dd = 0.0_f64;

    for &value in curve {
        peak = peak.max(value);
        let dd = if peak != 0.0 {
            (peak - value) / peak
        } else {
            0.0
        };
        max_dd = max_dd.max(dd);
    }
    max_dd
}

/// Absolute change from `initial` to the last curve value.
pub fn total_return(curve: &[f64], initial: f64) -> f64 {
    curve.last().map_or(0.0, |last| last - initial)
}

/// `total_return / initial * 100`, or 0.0 when `initial` is not positive.
pub fn return_pct(total_return: f64, initial: f64) -> f64 {
    if initial > 0.0 {
        (total_return / initial) * 100.0
    } else {
        0.0
    }
}

/// Fraction of SELL trades whose proceeds beat the shares' original cost.
///
/// 0.0 when there are no SELL trades. Symbols missing from `original_cost`
/// never count as wins.
pub fn win_rate(trades: &[Trade], original_cost: &IndexMap<String, f64>) -> f64 {
    let sells: Vec<&Trade> = trades.iter().filter(|t| t.is_sell()).collect();
    if sells.is_empty() {
        return 0.0;
    }
    let wins = sells
        .iter()
        .filter(|t| {
            original_cost
                .get(&t.symbol)
                .is_some_and(|&avg| t.is_winning_sell(avg))
        })
        .count();
    wins as f64 / sells.len() as f64
}
