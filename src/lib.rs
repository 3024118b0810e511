//! IPI Loss Component - operational risk loss indicator from loss and recovery registers
//!
//! This library provides:
//! - Loss and recovery register loading with structural validation
//! - Trailing 60-month window and recovery netting
//! - November-October band years and Type A / Type B threshold classification
//! - Consolidated band x type table, capital ratio and IPI lookup
//! - Threshold/CIN sensitivity runs and CSV/JSON report output

pub mod error;
pub mod register;
pub mod calculation;
pub mod scenario;
pub mod report;

// Re-export commonly used types
pub use error::{IpiError, IpiResult};
pub use register::{LossEvent, RecoveryRecord};
pub use calculation::{CalculationConfig, CalculationResult, IpiEngine, ThresholdClass};
pub use scenario::ScenarioRunner;
pub use report::{DashboardSummary, Report};
