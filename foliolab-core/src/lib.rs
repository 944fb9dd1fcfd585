//! FolioLab Core — holdings analysis engine.
//!
//! Everything here is pure computation over a caller-owned snapshot:
//! - Domain types (holdings, snapshots, signals, daily prices, trades)
//! - Composite health score with four sub-scores, risk level, recommendations
//! - Position and portfolio allocation signals with a confidence gate
//! - Signal transition alerts against a caller-held history
//! - Seeded synthetic price paths
//! - Rebalancing backtest against passive buy-and-hold
//!
//! No I/O and no global state. Every call that needs randomness builds its
//! own generator from an explicit seed.

pub mod alert;
pub mod assessment;
pub mod backtest;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod rng;
pub mod score;
pub mod simulator;

pub use alert::{detect_alerts, detect_change, Alert, SignalHistory};
pub use assessment::{recommendations, RiskLevel};
pub use backtest::{
    run_backtest, run_backtest_with, simulate_and_backtest, BacktestResult, PassiveMetrics,
};
pub use classifier::{classify_portfolio, classify_position, classify_positions};
pub use config::{RebalanceConfig, SimulationConfig};
pub use domain::{
    DayPrices, Holding, PortfolioSnapshot, PricePath, Signal, SignalKind, SignalMap, Trade,
    TradeAction,
};
pub use error::EngineError;
pub use gate::{gate, gate_all, ConfidenceThreshold};
pub use score::{position_weights, score_portfolio, PositionWeight, ScoreResult};
pub use simulator::{simulate, simulate_with, PriceSimulator};
