//! Batch analysis of several snapshots.
//!
//! Each snapshot is analysed with a fresh signal history and its own
//! generator, so parallel results equal sequential ones entry for entry.

use rayon::prelude::*;
use tracing::{info, warn};

use foliolab_core::{PortfolioSnapshot, SignalHistory};

use crate::analysis::{analyze, AnalysisReport, RunError};
use crate::config::AnalysisConfig;

/// A labelled snapshot to analyse.
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub label: String,
    pub snapshot: PortfolioSnapshot,
}

/// Outcome for one input. A failing snapshot does not abort the batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub label: String,
    pub result: Result<AnalysisReport, RunError>,
}

/// Analyses many snapshots under one configuration.
#[derive(Debug, Clone)]
pub struct BatchAnalyzer {
    config: AnalysisConfig,
    parallel: bool,
}

impl BatchAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            parallel: true,
        }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Outcomes in input order.
    pub fn run(&self, inputs: &[BatchInput]) -> Vec<BatchOutcome> {
        let outcomes: Vec<BatchOutcome> = if self.parallel {
            inputs.par_iter().map(|input| self.run_one(input)).collect()
        } else {
            inputs.iter().map(|input| self.run_one(input)).collect()
        };

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            inputs = inputs.len(),
            failed,
            parallel = self.parallel,
            "batch complete"
        );
        outcomes
    }

    fn run_one(&self, input: &BatchInput) -> BatchOutcome {
        let result = analyze(&input.snapshot, &self.config, &mut SignalHistory::new());
        if let Err(err) = &result {
            warn!(label = %input.label, error = %err, "batch entry failed");
        }
        BatchOutcome {
            label: input.label.clone(),
            result,
        }
    }
}
