//! IPI calculation pipeline
//!
//! Stages run strictly in order, each returning fresh data:
//! 1. **Window**: keep the trailing 60 months of the loss register
//! 2. **Recovery join**: aggregate recoveries per reference, left-join, net loss
//! 3. **Banding and classification**: Nov-Oct band years, Type A / Type B tests
//! 4. **Consolidation and indicator**: band x type table, average, C, IPI
//!
//! # Example
//!
//! ```rust,ignore
//! use ipi_loss_component::calculation::{IpiEngine, CalculationConfig};
//! use ipi_loss_component::register::{load_loss_register, load_recovery_register};
//!
//! let losses = load_loss_register("rero_perdida.csv")?;
//! let recoveries = load_recovery_register("rero_recuperado.csv")?;
//!
//! let engine = IpiEngine::new(CalculationConfig::default());
//! let result = engine.calculate(&losses, &recoveries);
//! println!("IPI: {}", result.ipi());
//! ```

mod banding;
mod classifier;
mod consolidation;
mod engine;
mod indicator;
mod recovery;
mod window;

pub use banding::{band_year, BandAssigner, BAND_ROLLOVER_MONTH};
pub use classifier::{
    classify, classify_row, risk_category_label, CategoryBandLoss, Classification,
    ClassifiedEvent, ReferenceBandLoss, ThresholdClass,
};
pub use consolidation::{ConsolidatedTable, TableRow};
pub use engine::{CalculationConfig, CalculationResult, IpiEngine, DEFAULT_CIN, DEFAULT_THRESHOLD};
pub use indicator::{lookup_ipi, IndicatorResult, CAPITAL_MULTIPLIER};
pub use recovery::{aggregate_recoveries, join_recoveries, AggregatedRecovery, EnrichedEvent};
pub use window::{filter_window, Window, WINDOW_MONTHS};
