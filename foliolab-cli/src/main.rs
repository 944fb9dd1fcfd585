//! FolioLab CLI — holdings health, allocation signals, and rebalancing backtests.
//!
//! Commands:
//! - `analyze` — full refresh: score, gated signals, alerts, backtest
//! - `score` — health score, risk level, and recommendations only
//! - `simulate` — print a synthetic price path for the holdings
//! - `backtest` — active rebalancing vs buy-and-hold on a simulated path
//! - `batch` — analyze several holdings files in parallel
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); results go to stdout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use foliolab_core::simulator::simulate_snapshot;
use foliolab_core::{
    recommendations, run_backtest_with, score_portfolio, BacktestResult, ConfidenceThreshold,
    PortfolioSnapshot, RiskLevel, ScoreResult, SignalHistory,
};
use foliolab_runner::{
    analyze, load_holdings, AnalysisConfig, AnalysisReport, BatchAnalyzer, BatchInput,
};

#[derive(Parser)]
#[command(
    name = "foliolab",
    about = "FolioLab CLI — portfolio health scoring and rebalancing backtests"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full analysis refresh for one holdings CSV.
    Analyze {
        /// Holdings CSV with symbol, quantity and avg_price columns.
        holdings: PathBuf,

        /// Path to a TOML analysis config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Confidence threshold in [0.4, 0.9]; overrides the config value.
        #[arg(long)]
        threshold: Option<f64>,

        /// Signal map JSON from the previous refresh, for alerts.
        #[arg(long)]
        previous: Option<PathBuf>,

        /// Write this refresh's signal map JSON here.
        #[arg(long)]
        signals_out: Option<PathBuf>,

        /// Print the report as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Score a holdings CSV.
    Score {
        holdings: PathBuf,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print a simulated price path starting from each holding's average price.
    Simulate {
        holdings: PathBuf,

        /// Path to a TOML analysis config (market constants, seed policy).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of days to simulate; overrides the config value.
        #[arg(long)]
        days: Option<u32>,

        /// Generator seed; overrides the config value.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Backtest the rebalancing strategy against buy-and-hold.
    Backtest {
        holdings: PathBuf,

        /// Path to a TOML analysis config (rebalance rules, market constants).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of days to simulate; overrides the config value.
        #[arg(long)]
        days: Option<u32>,

        /// Generator seed; overrides the config value.
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Analyze several holdings CSVs, each with a fresh signal history.
    Batch {
        #[arg(required = true)]
        holdings: Vec<PathBuf>,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Run one file at a time instead of in parallel.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            holdings,
            config,
            threshold,
            previous,
            signals_out,
            json,
        } => run_analyze(
            &holdings,
            config.as_deref(),
            threshold,
            previous.as_deref(),
            signals_out.as_deref(),
            json,
        ),
        Commands::Score { holdings, json } => run_score(&holdings, json),
        Commands::Simulate {
            holdings,
            config,
            days,
            seed,
            json,
        } => run_simulate(&holdings, config.as_deref(), days, seed, json),
        Commands::Backtest {
            holdings,
            config,
            days,
            seed,
            json,
        } => run_backtest_cmd(&holdings, config.as_deref(), days, seed, json),
        Commands::Batch {
            holdings,
            config,
            sequential,
            json,
        } => run_batch(&holdings, config.as_deref(), sequential, json),
    }
}

fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Apply `--days`/`--seed` on top of the loaded simulation settings.
fn with_horizon_overrides(
    mut config: AnalysisConfig,
    days: Option<u32>,
    seed: Option<u64>,
) -> AnalysisConfig {
    if let Some(days) = days {
        config.simulation.days = days;
    }
    if let Some(seed) = seed {
        config.simulation.seed = seed;
    }
    config
}

fn load_snapshot(path: &Path) -> Result<PortfolioSnapshot> {
    load_holdings(path).with_context(|| format!("loading holdings {}", path.display()))
}

fn load_history(path: Option<&Path>) -> Result<SignalHistory> {
    let Some(path) = path else {
        return Ok(SignalHistory::new());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading previous signals {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing previous signals {}", path.display()))
}

fn run_analyze(
    holdings: &Path,
    config_path: Option<&Path>,
    threshold: Option<f64>,
    previous: Option<&Path>,
    signals_out: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(t) = threshold {
        config.signals.confidence_threshold = ConfidenceThreshold::new(t)?;
    }
    let snapshot = load_snapshot(holdings)?;
    let mut history = load_history(previous)?;

    let report = analyze(&snapshot, &config, &mut history)?;

    if let Some(path) = signals_out {
        let content = serde_json::to_string_pretty(&history)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing signals {}", path.display()))?;
        info!(path = %path.display(), "signal map written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run_score(holdings: &Path, json: bool) -> Result<()> {
    let snapshot = load_snapshot(holdings)?;
    let score = score_portfolio(&snapshot)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&score)?);
    } else {
        print_score(&score);
    }
    Ok(())
}

fn run_simulate(
    holdings: &Path,
    config_path: Option<&Path>,
    days: Option<u32>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = with_horizon_overrides(load_config(config_path)?, days, seed);
    let snapshot = load_snapshot(holdings)?;
    let simulation = config.simulation_for(&snapshot);
    let path = simulate_snapshot(&snapshot, &simulation)?;
    info!(seed = simulation.seed, days = simulation.days, "path simulated");

    if json {
        println!("{}", serde_json::to_string_pretty(&path)?);
        return Ok(());
    }

    let symbols: Vec<&str> = snapshot.holdings().iter().map(|h| h.symbol.as_str()).collect();
    println!("{:>5}  {}", "day", symbols.join("  "));
    for day in &path {
        let prices: Vec<String> = symbols
            .iter()
            .map(|s| format!("{:.2}", day.prices.get(*s).copied().unwrap_or(f64::NAN)))
            .collect();
        println!("{:>5}  {}", day.day, prices.join("  "));
    }
    Ok(())
}

fn run_backtest_cmd(
    holdings: &Path,
    config_path: Option<&Path>,
    days: Option<u32>,
    seed: Option<u64>,
    json: bool,
) -> Result<()> {
    let config = with_horizon_overrides(load_config(config_path)?, days, seed);
    let snapshot = load_snapshot(holdings)?;
    let simulation = config.simulation_for(&snapshot);
    let path = simulate_snapshot(&snapshot, &simulation)?;
    let result = run_backtest_with(&snapshot, &path, &config.rebalance)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Seed:           {}", simulation.seed);
        print_backtest(&result);
    }
    Ok(())
}

fn run_batch(
    holdings: &[PathBuf],
    config_path: Option<&Path>,
    sequential: bool,
    json: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let inputs = holdings
        .iter()
        .map(|path| {
            Ok(BatchInput {
                label: path.display().to_string(),
                snapshot: load_snapshot(path)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let outcomes = BatchAnalyzer::new(config)
        .with_parallelism(!sequential)
        .run(&inputs);

    let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
    if json {
        let entries: Vec<BatchEntry<'_>> = outcomes
            .iter()
            .map(|o| BatchEntry {
                label: &o.label,
                report: o.result.as_ref().ok(),
                error: o.result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!(
            "{:<32} {:>5} {:>9} {:>10} {:>10} {:>8}",
            "holdings", "score", "risk", "active %", "passive %", "alpha"
        );
        for outcome in &outcomes {
            match &outcome.result {
                Ok(r) => println!(
                    "{:<32} {:>5} {:>9} {:>10.2} {:>10.2} {:>8.2}",
                    outcome.label,
                    r.score.score,
                    r.risk_level.to_string(),
                    r.backtest.return_pct,
                    r.backtest.passive.return_pct,
                    r.backtest.alpha
                ),
                Err(err) => println!("{:<32} ERROR: {err}", outcome.label),
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} holdings files failed", outcomes.len());
    }
    Ok(())
}

#[derive(Serialize)]
struct BatchEntry<'a> {
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn print_score(score: &ScoreResult) {
    let risk = RiskLevel::from_score(score.score);
    println!();
    println!("=== Portfolio Health ===");
    println!("Score:          {} / 100 ({risk} risk)", score.score);
    println!("                {}", risk.description());
    println!("Holdings:       {}", score.num_holdings);
    println!("Total Value:    {:.2}", score.total_value);
    println!();
    println!("--- Components ---");
    println!("Diversification:{:>3} / 30", score.diversification);
    println!("Concentration:  {:>3} / 20", score.concentration);
    println!("Volatility:     {:>3} / 25", score.volatility);
    println!("Drawdown:       {:>3} / 25", score.drawdown);
    println!();
    println!("Largest:        {}%", score.largest_position_pct);
    println!("Top 3:          {}%", score.top3_concentration_pct);
    println!("HHI:            {:.4}", score.hhi);

    let recs = recommendations(score);
    if !recs.is_empty() {
        println!();
        println!("--- Recommendations ---");
        for rec in recs {
            println!("- {rec}");
        }
    }
}

fn print_backtest(result: &BacktestResult) {
    println!();
    println!(
        "=== Backtest ({} days) ===",
        result.active_equity_curve.len().saturating_sub(1)
    );
    println!("Initial Value:  {:.2}", result.initial_value);
    println!("Trades:         {}", result.trade_count);
    println!();
    println!("--- Active (rebalanced) ---");
    println!("Final Value:    {:.2}", result.final_value);
    println!("Return:         {:.2}%", result.return_pct);
    println!("Max Drawdown:   {:.2}%", result.max_drawdown * 100.0);
    println!("Win Rate:       {:.1}%", result.win_rate * 100.0);
    println!();
    println!("--- Passive (buy and hold) ---");
    println!("Final Value:    {:.2}", result.passive.final_value);
    println!("Return:         {:.2}%", result.passive.return_pct);
    println!("Max Drawdown:   {:.2}%", result.passive.max_drawdown * 100.0);
    println!();
    println!("Alpha:          {:+.2}%", result.alpha);
    if result.missing_price_days > 0 {
        println!("WARNING: {} symbol-days had no price", result.missing_price_days);
    }
}

fn print_report(report: &AnalysisReport) {
    println!(
        "Refreshed:      {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("Fingerprint:    {}", report.fingerprint);
    print_score(&report.score);

    println!();
    println!("--- Signals (threshold {}) ---", report.threshold);
    println!(
        "{:<10} {:<12} {:>6} {:>6}  explanation",
        "symbol", "signal", "weight", "conf"
    );
    for (symbol, signal) in &report.positions {
        let weight = signal
            .weight_pct
            .map_or_else(|| "-".to_string(), |w| format!("{w}%"));
        println!(
            "{:<10} {:<12} {:>6} {:>6.2}  {}",
            symbol,
            signal.kind.as_str(),
            weight,
            signal.confidence,
            signal.explanation
        );
    }
    println!(
        "{:<10} {:<12} {:>6} {:>6.2}  {}",
        "PORTFOLIO",
        report.portfolio.kind.as_str(),
        "-",
        report.portfolio.confidence,
        report.portfolio.explanation
    );

    if !report.alerts.is_empty() {
        println!();
        println!("--- Alerts ---");
        for alert in &report.alerts {
            println!("{alert}");
        }
    }

    println!();
    println!("Seed:           {}", report.seed);
    print_backtest(&report.backtest);
}
