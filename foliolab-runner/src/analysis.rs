//! Per-refresh analysis pipeline.
//!
//! One refresh takes a validated snapshot through the whole engine:
//! 1. Score and risk level, plus recommendations
//! 2. Position and portfolio signals, passed through the confidence gate
//! 3. Alerts against the caller's signal history (ungated signals)
//! 4. Simulated price path and rebalancing backtest
//!
//! The history is only replaced once every fallible step has succeeded, so a
//! failed refresh leaves it untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use foliolab_core::{
    classify_portfolio, classify_positions, gate, gate_all, recommendations, score_portfolio,
    simulate_and_backtest, Alert, BacktestResult, ConfidenceThreshold, EngineError,
    PortfolioSnapshot, RiskLevel, ScoreResult, Signal, SignalHistory,
};

use crate::config::{AnalysisConfig, ConfigError};
use crate::fingerprint::run_fingerprint;
use crate::holdings::HoldingsError;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("holdings error: {0}")]
    Holdings(#[from] HoldingsError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("fingerprint error: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Everything the presentation layer needs from one refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// BLAKE3 hex digest of (snapshot, config, seed).
    pub fingerprint: String,
    /// Seed the simulator actually used.
    pub seed: u64,
    pub score: ScoreResult,
    pub risk_level: RiskLevel,
    pub risk_description: String,
    pub recommendations: Vec<String>,
    pub threshold: ConfidenceThreshold,
    /// Gated per-symbol signals, in snapshot order.
    pub positions: IndexMap<String, Signal>,
    /// Gated portfolio-level signal.
    pub portfolio: Signal,
    pub alerts: Vec<Alert>,
    pub backtest: BacktestResult,
}

impl AnalysisReport {
    /// Number of position signals muted by the gate.
    pub fn muted_count(&self) -> usize {
        self.positions.values().filter(|s| s.muted).count()
    }
}

/// Run one refresh for `snapshot`, updating `history` on success.
pub fn analyze(
    snapshot: &PortfolioSnapshot,
    config: &AnalysisConfig,
    history: &mut SignalHistory,
) -> Result<AnalysisReport, RunError> {
    config.validate()?;
    let threshold = config.threshold();

    let score = score_portfolio(snapshot)?;
    let risk_level = RiskLevel::from_score(score.score);

    let base = classify_positions(snapshot, &score)?;
    let positions: IndexMap<String, Signal> = gate_all(&base, threshold).into_iter().collect();
    let portfolio = gate(&classify_portfolio(&score), threshold);

    let simulation = config.simulation_for(snapshot);
    let seed = simulation.seed;
    let backtest = simulate_and_backtest(snapshot, &simulation, &config.rebalance)?;
    let fingerprint = run_fingerprint(snapshot, config, seed)?;

    let alerts = history.refresh(&base);
    for alert in &alerts {
        debug!(symbol = %alert.symbol, from = %alert.from, to = %alert.to, "signal changed");
    }

    let report = AnalysisReport {
        fingerprint,
        seed,
        recommendations: recommendations(&score),
        risk_description: risk_level.description().to_string(),
        risk_level,
        score,
        threshold,
        positions,
        portfolio,
        alerts,
        backtest,
    };

    info!(
        holdings = snapshot.len(),
        score = report.score.score,
        risk = %report.risk_level,
        muted = report.muted_count(),
        alerts = report.alerts.len(),
        trades = report.backtest.trade_count,
        alpha = report.backtest.alpha,
        "analysis complete"
    );
    Ok(report)
}
