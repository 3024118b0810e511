//! Calculation engine running the four pipeline stages in order

use super::classifier::{classify, CategoryBandLoss, ClassifiedEvent, ReferenceBandLoss};
use super::consolidation::ConsolidatedTable;
use super::indicator::IndicatorResult;
use super::recovery::{aggregate_recoveries, join_recoveries};
use super::window::{filter_window, Window};
use crate::register::{LossEvent, RecoveryRecord};
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Default monetary threshold separating significant loss events
pub const DEFAULT_THRESHOLD: f64 = 27_470_842.66;

/// Default capital indicator (CIN)
pub const DEFAULT_CIN: f64 = 13_946_774_132.33;

/// Scalar parameters of a calculation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Monetary threshold for the Type A and Type B tests
    pub threshold: f64,

    /// Capital indicator used as the ratio denominator
    pub cin: f64,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            cin: DEFAULT_CIN,
        }
    }
}

impl CalculationConfig {
    pub fn new(threshold: f64, cin: f64) -> Self {
        Self { threshold, cin }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_cin(mut self, cin: f64) -> Self {
        self.cin = cin;
        self
    }
}

/// Everything produced by one calculation run
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResult {
    /// Parameters the run used
    pub config: CalculationConfig,

    /// Observation window, `None` for an empty loss register
    pub window: Option<Window>,

    /// Windowed events with recoveries, band and classification
    pub events: Vec<ClassifiedEvent>,

    /// (band, reference) pairs whose net loss exceeded the threshold
    pub over_threshold: Vec<ReferenceBandLoss>,

    /// (category, band) groups whose gross loss met the threshold
    pub flagged_categories: Vec<CategoryBandLoss>,

    /// Band x type table
    pub table: ConsolidatedTable,

    /// Average, capital result, ratio and IPI
    pub indicator: IndicatorResult,
}

impl CalculationResult {
    pub fn average_annual_loss(&self) -> f64 {
        self.indicator.average_annual_loss
    }

    pub fn ipi(&self) -> f64 {
        self.indicator.ipi
    }
}

/// Main calculation engine
#[derive(Debug, Clone, Default)]
pub struct IpiEngine {
    config: CalculationConfig,
}

impl IpiEngine {
    /// Create a new engine with the given parameters
    pub fn new(config: CalculationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    /// Run the full pipeline over one dataset.
    /// Degenerate inputs (empty register, no bands, CIN <= 0) yield zero-valued results.
    pub fn calculate(&self, losses: &[LossEvent], recoveries: &[RecoveryRecord]) -> CalculationResult {
        let (window, windowed) = filter_window(losses);
        match window {
            Some(w) => info!(
                "Window {} to {}: kept {} of {} loss rows",
                w.start,
                w.end,
                windowed.len(),
                losses.len()
            ),
            None => warn!("Loss register is empty; producing an empty result"),
        }

        let aggregated = aggregate_recoveries(recoveries);
        let enriched = join_recoveries(&windowed, &aggregated);

        let classification = classify(enriched, self.config.threshold);
        let table = ConsolidatedTable::build(
            &classification.type_a_by_band(),
            &classification.type_b_by_band(),
        );

        let indicator = IndicatorResult::compute(table.average_annual_loss(), self.config.cin);
        if self.config.cin <= 0.0 {
            warn!("CIN is {} (not positive); ratio C set to 0", self.config.cin);
        }
        info!(
            "Average annual loss {:.2} over {} bands, C = {:.4}, IPI = {}",
            indicator.average_annual_loss,
            table.bands.len(),
            indicator.ratio,
            indicator.ipi
        );

        CalculationResult {
            config: self.config,
            window,
            events: classification.events,
            over_threshold: classification.type_a_pairs,
            flagged_categories: classification.type_b_groups,
            table,
            indicator,
        }
    }
}
