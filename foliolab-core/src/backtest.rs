//! Day-by-day rebalancing backtest against passive buy-and-hold.
//!
//! Two books run over the same price path:
//! - **passive**: the snapshot's original quantities, never traded.
//! - **active**: an engine-owned clone of those quantities plus a cash balance
//!   that starts at zero. On every rebalance day, heavily overweight
//!   positions are sold down toward an equal-weight target and the proceeds
//!   are spread across the most underweight positions.
//!
//! Both equity curves start with the snapshot's cost value, so a path of
//! `n` days yields curves of length `n + 1`. A symbol missing from a day's
//! price map is skipped for that day's valuation and trading.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{RebalanceConfig, SimulationConfig};
use crate::domain::{DayPrices, PortfolioSnapshot, SignalKind, Trade, TradeAction};
use crate::error::EngineError;
use crate::metrics::{max_drawdown, return_pct, total_return, win_rate};
use crate::simulator::simulate_snapshot;

/// Buy-and-hold benchmark metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveMetrics {
    pub total_return: f64,
    pub return_pct: f64,
    pub final_value: f64,
    pub initial_value: f64,
    pub max_drawdown: f64,
}

/// Result of one backtest run. Active-strategy metrics sit at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub total_return: f64,
    pub return_pct: f64,
    pub final_value: f64,
    pub initial_value: f64,
    pub trade_count: usize,
    pub win_rate: f64,
    pub max_drawdown: f64,
    pub passive: PassiveMetrics,
    /// Active return percentage minus passive return percentage.
    pub alpha: f64,
    pub active_equity_curve: Vec<f64>,
    pub passive_equity_curve: Vec<f64>,
    pub trades: Vec<Trade>,
    /// Number of (day, symbol) pairs skipped because the day had no usable price.
    pub missing_price_days: usize,
}

/// The backtest's own overweight/underweight read, independent of the
/// position classifier. Weight is measured against the active book's value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebalanceSignal {
    pub kind: SignalKind,
    pub confidence: f64,
    pub weight: f64,
}

pub fn rebalance_signal(
    quantity: f64,
    price: f64,
    book_value: f64,
    config: &RebalanceConfig,
) -> RebalanceSignal {
    let weight = quantity * price / book_value;

    if weight > config.overweight_weight {
        return RebalanceSignal {
            kind: SignalKind::Overweight,
            confidence: config.overweight_base_confidence
                + (weight - config.overweight_weight) * config.overweight_confidence_slope,
            weight,
        };
    }
    if weight < config.underweight_weight {
        return RebalanceSignal {
            kind: SignalKind::Underweight,
            confidence: config.underweight_confidence,
            weight,
        };
    }
    RebalanceSignal {
        kind: SignalKind::Balanced,
        confidence: config.balanced_confidence,
        weight,
    }
}

/// Run with the default rebalancing rules.
pub fn run_backtest(
    snapshot: &PortfolioSnapshot,
    path: &[DayPrices],
) -> Result<BacktestResult, EngineError> {
    run_backtest_with(snapshot, path, &RebalanceConfig::default())
}

/// Run with explicit rebalancing rules.
pub fn run_backtest_with(
    snapshot: &PortfolioSnapshot,
    path: &[DayPrices],
    config: &RebalanceConfig,
) -> Result<BacktestResult, EngineError> {
    config.validate()?;
    if snapshot.is_empty() {
        return Err(EngineError::EmptyPortfolio);
    }
    let initial_value = snapshot.total_cost();
    if !(initial_value > 0.0) {
        return Err(EngineError::EmptyPortfolio);
    }

    let mut book = ActiveBook::from_snapshot(snapshot);
    let original_cost: IndexMap<String, f64> = snapshot
        .holdings()
        .iter()
        .map(|h| (h.symbol.clone(), h.avg_price))
        .collect();
    let target_weight = 1.0 / snapshot.len() as f64;

    let mut passive_curve = Vec::with_capacity(path.len() + 1);
    let mut active_curve = Vec::with_capacity(path.len() + 1);
    passive_curve.push(initial_value);
    active_curve.push(initial_value);

    let mut trades = Vec::new();
    let mut missing_price_days = 0;

    for day in path {
        let missing = snapshot
            .holdings()
            .iter()
            .filter(|h| day.price(&h.symbol).is_none())
            .count();
        if missing > 0 {
            debug!(day = day.day, missing, "skipping symbols without a price");
            missing_price_days += missing;
        }

        passive_curve.push(passive_value(snapshot, day));

        let active_value = book.value(day);
        if config.is_rebalance_day(day.day) && active_value > 0.0 {
            book.rebalance(day, active_value, target_weight, config, &mut trades);
        }
        active_curve.push(book.value(day));
    }

    let final_value = active_curve.last().copied().unwrap_or(initial_value);
    let active_return = total_return(&active_curve, initial_value);
    let active_return_pct = return_pct(active_return, initial_value);

    let passive_final = passive_curve.last().copied().unwrap_or(initial_value);
    let passive_return = total_return(&passive_curve, initial_value);
    let passive_return_pct = return_pct(passive_return, initial_value);

    debug!(
        days = path.len(),
        trades = trades.len(),
        active_return_pct,
        passive_return_pct,
        "backtest complete"
    );

    Ok(BacktestResult {
        total_return: active_return,
        return_pct: active_return_pct,
        final_value,
        initial_value,
        trade_count: trades.len(),
        win_rate: win_rate(&trades, &original_cost),
        max_drawdown: max_drawdown(&active_curve),
        passive: PassiveMetrics {
            total_return: passive_return,
            return_pct: passive_return_pct,
            final_value: passive_final,
            initial_value,
            max_drawdown: max_drawdown(&passive_curve),
        },
        alpha: active_return_pct - passive_return_pct,
        active_equity_curve: active_curve,
        passive_equity_curve: passive_curve,
        trades,
        missing_price_days,
    })
}

/// Simulate a fresh path from the snapshot's average costs, then backtest it.
pub fn simulate_and_backtest(
    snapshot: &PortfolioSnapshot,
    simulation: &SimulationConfig,
    rebalance: &RebalanceConfig,
) -> Result<BacktestResult, EngineError> {
    let path = simulate_snapshot(snapshot, simulation)?;
    run_backtest_with(snapshot, &path, rebalance)
}

fn passive_value(snapshot: &PortfolioSnapshot, day: &DayPrices) -> f64 {
    let mut value = 0.0;
    for holding in snapshot.holdings() {
        if let Some(price) = day.price(&holding.symbol) {
            value += holding.quantity * price;
        }
    }
    value
}

/// Engine-owned working copy of the active strategy's quantities and cash.
#[derive(Debug, Clone)]
struct ActiveBook {
    quantities: IndexMap<String, f64>,
    cash: f64,
}

impl ActiveBook {
    fn from_snapshot(snapshot: &PortfolioSnapshot) -> Self {
        Self {
            quantities: snapshot
                .holdings()
                .iter()
                .map(|h| (h.symbol.clone(), h.quantity))
                .collect(),
            cash: 0.0,
        }
    }

    /// Cash plus every priced, non-empty position.
    fn value(&self, day: &DayPrices) -> f64 {
        let mut value = self.cash;
        for (symbol, &quantity) in &self.quantities {
            if quantity <= 0.0 {
                continue;
            }
            if let Some(price) = day.price(symbol) {
                value += quantity * price;
            }
        }
        value
    }

    /// Sell pass then buy pass, both sized against the pre-trade `book_value`.
    fn rebalance(
        &mut self,
        day: &DayPrices,
        book_value: f64,
        target_weight: f64,
        config: &RebalanceConfig,
        trades: &mut Vec<Trade>,
    ) {
        let target_value = book_value * target_weight;

        for (symbol, quantity) in self.quantities.iter_mut() {
            let Some(price) = day.price(symbol) else {
                continue;
            };
            if *quantity <= 0.0 {
                continue;
            }
            let signal = rebalance_signal(*quantity, price, book_value, config);
            if signal.kind != SignalKind::Overweight || signal.weight <= config.sell_trigger_weight
            {
                continue;
            }

            let excess_value = *quantity * price - target_value;
            if excess_value <= 0.0 {
                continue;
            }
            let shares = (excess_value / price).floor();
            if shares > 0.0 {
                let trade = Trade::new(day.day, symbol, TradeAction::Sell, shares as u64, price);
                *quantity -= shares;
                self.cash += trade.value;
                debug!(
                    day = day.day,
                    %symbol,
                    shares = trade.shares,
                    price,
                    weight = signal.weight,
                    confidence = signal.confidence,
                    "sell overweight"
                );
                trades.push(trade);
            }
        }

        if self.cash <= config.min_cash {
            return;
        }

        let mut candidates: Vec<(usize, f64, f64)> = self
            .quantities
            .iter()
            .enumerate()
            .filter_map(|(index, (symbol, &quantity))| {
                let price = day.price(symbol)?;
                let signal = rebalance_signal(quantity, price, book_value, config);
                (signal.kind == SignalKind::Underweight).then_some((index, price, signal.weight))
            })
            .collect();
        candidates.sort_by(|a, b| a.2.total_cmp(&b.2));

        for (index, price, weight) in candidates {
            if self.cash < config.min_cash {
                break;
            }
            let Some((symbol, quantity)) = self.quantities.get_index_mut(index) else {
                continue;
            };
            let deficit = target_value - *quantity * price;
            let buy_amount = deficit.min(self.cash * config.cash_deploy_fraction);
            let shares = (buy_amount / price).floor();
            if shares > 0.0 {
                let trade = Trade::new(day.day, symbol, TradeAction::Buy, shares as u64, price);
                *quantity += shares;
                self.cash -= trade.value;
                debug!(
                    day = day.day,
                    %symbol,
                    shares = trade.shares,
                    price,
                    weight,
                    "buy underweight"
                );
                trades.push(trade);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Holding;

    fn snapshot(holdings: &[(&str, f64, f64)]) -> PortfolioSnapshot {
        PortfolioSnapshot::new(
            holdings
                .iter()
                .map(|(s, q, p)| Holding::new(*s, *q, *p))
                .collect(),
        )
        .unwrap()
    }

    fn flat_path(days: u32, prices: &[(&str, f64)]) -> Vec<DayPrices> {
        (1..=days)
            .map(|d| {
                DayPrices::new(
                    d,
                    prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn rebalance_signal_bands() {
        let cfg = RebalanceConfig::default();
        let over = rebalance_signal(30.0, 10.0, 1000.0, &cfg);
        assert_eq!(over.kind, SignalKind::Overweight);
        assert!((over.confidence - 0.7).abs() < 1e-12);

        let under = rebalance_signal(2.0, 10.0, 1000.0, &cfg);
        assert_eq!(under.kind, SignalKind::Underweight);
        assert_eq!(under.confidence, 0.55);

        let balanced = rebalance_signal(10.0, 10.0, 1000.0, &cfg);
        assert_eq!(balanced.kind, SignalKind::Balanced);
        assert_eq!(balanced.confidence, 0.6);
    }

    #[test]
    fn curves_start_at_initial_value() {
        let snap = snapshot(&[("A", 10.0, 100.0), ("B", 5.0, 200.0)]);
        let path = flat_path(60, &[("A", 100.0), ("B", 200.0)]);
        let result = run_backtest(&snap, &path).unwrap();

        assert_eq!(result.active_equity_curve.len(), 61);
        assert_eq!(result.passive_equity_curve.len(), 61);
        assert_eq!(result.active_equity_curve[0], 2000.0);
        assert_eq!(result.passive_equity_curve[0], 2000.0);
        assert_eq!(result.initial_value, 2000.0);
    }

    #[test]
    fn flat_prices_balanced_book_never_trades() {
        let snap = snapshot(&[("A", 10.0, 100.0), ("B", 5.0, 200.0)]);
        let path = flat_path(60, &[("A", 100.0), ("B", 200.0)]);
        let result = run_backtest(&snap, &path).unwrap();

        // Both at 0.5 weight = target: overweight but no excess to sell.
        assert_eq!(result.trade_count, 0);
        assert_eq!(result.win_rate, 0.0);
        assert_eq!(result.total_return, 0.0);
        assert_eq!(result.alpha, 0.0);
        assert_eq!(result.max_drawdown, 0.0);
    }

    #[test]
    fn concentrated_book_sells_then_buys() {
        // Target weight 1/4 = 0.25. BIG is 0.85 of the book.
        let snap = snapshot(&[
            ("BIG", 85.0, 100.0),
            ("M1", 6.0, 100.0),
            ("M2", 7.0, 100.0),
            ("TINY", 2.0, 100.0),
        ]);
        let prices = [("BIG", 100.0), ("M1", 100.0), ("M2", 100.0), ("TINY", 100.0)];
        let path = flat_path(10, &prices);
        let result = run_backtest(&snap, &path).unwrap();

        // Day 10 is the first rebalance day.
        assert!(result.trades.iter().all(|t| t.day == 10));

        // Sell: excess 8500 - 2500 = 6000 → 60 shares.
        let sell = &result.trades[0];
        assert_eq!(sell.action, TradeAction::Sell);
        assert_eq!(sell.symbol, "BIG");
        assert_eq!(sell.shares, 60);
        assert_eq!(sell.value, 6000.0);

        // Only TINY (0.02) is under 0.03. Deficit 2500 - 200 = 2300, half of
        // cash is 3000 → buy 23 shares.
        let buy = &result.trades[1];
        assert_eq!(buy.action, TradeAction::Buy);
        assert_eq!(buy.symbol, "TINY");
        assert_eq!(buy.shares, 23);
        assert_eq!(result.trade_count, 2);

        // Flat prices: selling at cost is not a win.
        assert_eq!(result.win_rate, 0.0);
        // Value only moves between cash and shares.
        assert!((result.final_value - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn profitable_sell_counts_as_win() {
        let snap = snapshot(&[("BIG", 80.0, 100.0), ("A", 10.0, 100.0), ("B", 10.0, 100.0)]);
        let path = flat_path(10, &[("BIG", 120.0), ("A", 100.0), ("B", 100.0)]);
        let result = run_backtest(&snap, &path).unwrap();

        let sells: Vec<_> = result.trades.iter().filter(|t| t.is_sell()).collect();
        assert_eq!(sells.len(), 1);
        assert_eq!(result.win_rate, 1.0);
    }

    #[test]
    fn no_rebalance_before_day_ten() {
        let snap = snapshot(&[("BIG", 90.0, 100.0), ("S", 10.0, 100.0)]);
        let path = flat_path(9, &[("BIG", 100.0), ("S", 100.0)]);
        let result = run_backtest(&snap, &path).unwrap();
        assert_eq!(result.trade_count, 0);
    }

    #[test]
    fn missing_price_is_skipped_not_fatal() {
        let snap = snapshot(&[("A", 10.0, 100.0), ("B", 10.0, 100.0)]);
        let mut path = flat_path(3, &[("A", 100.0), ("B", 100.0)]);
        path[1].prices.shift_remove("B");

        let result = run_backtest(&snap, &path).unwrap();
        assert_eq!(result.missing_price_days, 1);
        assert_eq!(result.passive_equity_curve[2], 1000.0);
        assert_eq!(result.active_equity_curve[2], 1000.0);
        assert_eq!(result.passive_equity_curve[3], 2000.0);
    }

    #[test]
    fn symbol_missing_on_rebalance_day_is_left_out_of_the_book() {
        let snap = snapshot(&[("BIG", 85.0, 100.0), ("A", 10.0, 100.0), ("B", 5.0, 100.0)]);
        let mut path = flat_path(10, &[("BIG", 100.0), ("A", 100.0), ("B", 100.0)]);
        path[9].prices.shift_remove("BIG");

        let result = run_backtest(&snap, &path).unwrap();
        assert_eq!(result.missing_price_days, 1);
        assert!(result.trades.iter().all(|t| t.symbol != "BIG"));

        // Without BIG the book is 1500 and the target 1500 / 3 = 500. A sits at
        // 2/3 of that book and sells its 500 excess; against the full 10000
        // book it would have read as balanced.
        assert_eq!(result.trade_count, 1);
        let sell = &result.trades[0];
        assert_eq!(sell.day, 10);
        assert_eq!(sell.symbol, "A");
        assert_eq!(sell.action, TradeAction::Sell);
        assert_eq!(sell.shares, 5);

        assert_eq!(result.active_equity_curve[10], 1500.0);
        assert_eq!(result.passive_equity_curve[10], 1500.0);
    }

    #[test]
    fn most_underweight_candidate_buys_first() {
        // U1 precedes U2 in the snapshot but U2 is further below target.
        let snap = snapshot(&[
            ("BIG", 90.0, 100.0),
            ("U1", 2.0, 100.0),
            ("U2", 1.0, 100.0),
            ("M", 7.0, 100.0),
        ]);
        let prices = [("BIG", 100.0), ("U1", 100.0), ("U2", 100.0), ("M", 100.0)];
        let result = run_backtest(&snap, &flat_path(10, &prices)).unwrap();

        // Sell 65 BIG: cash 6500. U2 deficit 2400 < 3250 → 24 shares, cash 4100.
        // U1 deficit 2300 > 2050 → 20 shares, cash 2100.
        let summary: Vec<_> = result
            .trades
            .iter()
            .map(|t| (t.symbol.as_str(), t.action, t.shares))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("BIG", TradeAction::Sell, 65),
                ("U2", TradeAction::Buy, 24),
                ("U1", TradeAction::Buy, 20),
            ]
        );
    }

    #[test]
    fn buying_stops_once_cash_drops_below_min_cash() {
        let snap = snapshot(&[
            ("BIG", 90.0, 100.0),
            ("U1", 2.0, 100.0),
            ("U2", 1.0, 100.0),
            ("M", 7.0, 100.0),
        ]);
        let prices = [("BIG", 100.0), ("U1", 100.0), ("U2", 100.0), ("M", 100.0)];
        let cfg = RebalanceConfig {
            min_cash: 5000.0,
            ..RebalanceConfig::default()
        };
        let result = run_backtest_with(&snap, &flat_path(10, &prices), &cfg).unwrap();

        // 6500 cash clears the bar; after the U2 buy 4100 does not, so U1 is skipped.
        let buys: Vec<_> = result.trades.iter().filter(|t| !t.is_sell()).collect();
        assert_eq!(buys.len(), 1);
        assert_eq!(buys[0].symbol, "U2");
        assert_eq!(buys[0].shares, 24);
        assert!((result.final_value - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_snapshot_rejected() {
        let snap = PortfolioSnapshot::new(vec![]).unwrap();
        assert_eq!(run_backtest(&snap, &[]), Err(EngineError::EmptyPortfolio));
    }

    #[test]
    fn zero_value_snapshot_rejected() {
        let snap = snapshot(&[("A", 0.0, 100.0)]);
        assert_eq!(run_backtest(&snap, &[]), Err(EngineError::EmptyPortfolio));
    }

    #[test]
    fn empty_path_yields_single_point_curves() {
        let snap = snapshot(&[("A", 1.0, 100.0)]);
        let result = run_backtest(&snap, &[]).unwrap();
        assert_eq!(result.active_equity_curve, vec![100.0]);
        assert_eq!(result.final_value, 100.0);
        assert_eq!(result.return_pct, 0.0);
    }

    #[test]
    fn simulated_run_is_reproducible() {
        let snap = snapshot(&[("A", 10.0, 150.0), ("B", 40.0, 20.0), ("C", 3.0, 900.0)]);
        let sim = SimulationConfig::default();
        let cfg = RebalanceConfig::default();
        let a = simulate_and_backtest(&snap, &sim, &cfg).unwrap();
        let b = simulate_and_backtest(&snap, &sim, &cfg).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.active_equity_curve.len(), 61);
        assert_eq!(a.missing_price_days, 0);
    }

    #[test]
    fn degenerate_avg_price_fails_fast() {
        let snap = snapshot(&[("A", 10.0, 150.0), ("FREE", 5.0, 0.0)]);
        let err = simulate_and_backtest(&snap, &SimulationConfig::default(), &RebalanceConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::DegeneratePrice { .. }));
    }

    #[test]
    fn caller_snapshot_untouched() {
        let snap = snapshot(&[("BIG", 85.0, 100.0), ("TINY", 2.0, 100.0), ("M", 13.0, 100.0)]);
        let before = snap.clone();
        let path = flat_path(20, &[("BIG", 100.0), ("TINY", 100.0), ("M", 100.0)]);
        let result = run_backtest(&snap, &path).unwrap();
        assert!(result.trade_count > 0);
        assert_eq!(snap, before);
    }
}
