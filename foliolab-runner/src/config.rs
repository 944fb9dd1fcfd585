//! Serializable analysis configuration, loaded from TOML.
//!
//! ```toml
//! seed_policy = "fixed"
//!
//! [simulation]
//! days = 60
//! seed = 12345
//!
//! [rebalance]
//! sell_trigger_weight = 0.25
//!
//! [signals]
//! confidence_threshold = 0.6
//! ```
//!
//! Every key is optional and falls back to the engine defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use foliolab_core::{
    ConfidenceThreshold, EngineError, PortfolioSnapshot, RebalanceConfig, SimulationConfig,
};

use crate::fingerprint::portfolio_seed;

/// Errors from loading or validating an [`AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] EngineError),
}

/// How the simulator seed is chosen for each analysed snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Use `simulation.seed` as-is for every snapshot.
    #[default]
    Fixed,
    /// Mix `simulation.seed` with the snapshot contents, so different
    /// portfolios get different market paths.
    PerPortfolio,
}

/// Confidence gate settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalsConfig {
    pub confidence_threshold: ConfidenceThreshold,
}

/// Everything one analysis refresh needs besides the snapshot itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub seed_policy: SeedPolicy,
    pub simulation: SimulationConfig,
    pub rebalance: RebalanceConfig,
    pub signals: SignalsConfig,
}

impl AnalysisConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.rebalance.validate()?;
        Ok(())
    }

    pub fn threshold(&self) -> ConfidenceThreshold {
        self.signals.confidence_threshold
    }

    /// The seed the simulator will use for `snapshot` under this policy.
    pub fn effective_seed(&self, snapshot: &PortfolioSnapshot) -> u64 {
        match self.seed_policy {
            SeedPolicy::Fixed => self.simulation.seed,
            SeedPolicy::PerPortfolio => portfolio_seed(self.simulation.seed, snapshot),
        }
    }

    /// Simulation settings with the effective seed for `snapshot` applied.
    pub fn simulation_for(&self, snapshot: &PortfolioSnapshot) -> SimulationConfig {
        SimulationConfig {
            seed: self.effective_seed(snapshot),
            ..self.simulation.clone()
        }
    }
}
