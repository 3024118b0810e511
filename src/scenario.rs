//! Scenario runner for threshold and CIN sensitivity
//!
//! Loads the registers once, then allows running the calculation under many
//! configurations without re-reading CSV files.

use crate::calculation::{CalculationConfig, CalculationResult, IpiEngine};
use crate::error::IpiResult;
use crate::register::{load_loss_register, load_recovery_register, LossEvent, RecoveryRecord};
use serde::Serialize;
use std::path::Path;

/// Headline figures of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    pub threshold: f64,
    pub cin: f64,
    pub type_a_references: usize,
    pub average_annual_loss: f64,
    pub ratio: f64,
    pub ipi: f64,
}

impl From<&CalculationResult> for ScenarioOutcome {
    fn from(result: &CalculationResult) -> Self {
        let type_a_references = result
            .over_threshold
            .iter()
            .map(|p| p.reference.as_str())
            .collect::<std::collections::BTreeSet<_>>()
            .len();

        Self {
            threshold: result.config.threshold,
            cin: result.config.cin,
            type_a_references,
            average_annual_loss: result.indicator.average_annual_loss,
            ratio: result.indicator.ratio,
            ipi: result.indicator.ipi,
        }
    }
}

/// Pre-loaded dataset for repeated calculations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv("rero_perdida.csv", "rero_recuperado.csv")?;
///
/// for threshold in [20e6, 27.5e6, 35e6] {
///     let result = runner.run(CalculationConfig::default().with_threshold(threshold));
///     println!("{} -> IPI {}", threshold, result.ipi());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    losses: Vec<LossEvent>,
    recoveries: Vec<RecoveryRecord>,
}

impl ScenarioRunner {
    /// Create runner from already loaded registers
    pub fn new(losses: Vec<LossEvent>, recoveries: Vec<RecoveryRecord>) -> Self {
        Self { losses, recoveries }
    }

    /// Create runner by loading both registers from CSV files
    pub fn from_csv(losses: impl AsRef<Path>, recoveries: impl AsRef<Path>) -> IpiResult<Self> {
        Ok(Self {
            losses: load_loss_register(losses)?,
            recoveries: load_recovery_register(recoveries)?,
        })
    }

    /// Run a single calculation with the given config
    pub fn run(&self, config: CalculationConfig) -> CalculationResult {
        IpiEngine::new(config).calculate(&self.losses, &self.recoveries)
    }

    /// Run the calculation once per config
    pub fn run_scenarios(&self, configs: &[CalculationConfig]) -> Vec<CalculationResult> {
        configs.iter().map(|config| self.run(*config)).collect()
    }

    /// Headline figures for each threshold, keeping the base CIN
    pub fn threshold_sensitivity(&self, base: CalculationConfig, thresholds: &[f64]) -> Vec<ScenarioOutcome> {
        thresholds
            .iter()
            .map(|&t| ScenarioOutcome::from(&self.run(base.with_threshold(t))))
            .collect()
    }

    pub fn losses(&self) -> &[LossEvent] {
        &self.losses
    }

    pub fn recoveries(&self) -> &[RecoveryRecord] {
        &self.recoveries
    }
}
