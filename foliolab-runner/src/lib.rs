//! FolioLab Runner — analysis orchestration around `foliolab-core`.
//!
//! This crate provides:
//! - TOML analysis configuration with seed policy
//! - Holdings CSV loading into validated snapshots
//! - The per-refresh pipeline (score, gated signals, alerts, backtest)
//! - Run fingerprinting and per-portfolio seed derivation
//! - Parallel batch analysis

pub mod analysis;
pub mod batch;
pub mod config;
pub mod fingerprint;
pub mod holdings;

pub use analysis::{analyze, AnalysisReport, RunError};
pub use batch::{BatchAnalyzer, BatchInput, BatchOutcome};
pub use config::{AnalysisConfig, ConfigError, SeedPolicy, SignalsConfig};
pub use fingerprint::{portfolio_seed, run_fingerprint};
pub use holdings::{load_holdings, read_holdings, HoldingsError};
