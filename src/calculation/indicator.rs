//! Capital ratio and IPI lookup

use serde::Serialize;

/// Multiplier applied to the average annual loss
pub const CAPITAL_MULTIPLIER: f64 = 15.0;

/// (inclusive upper bound of C, IPI) in ascending order
static IPI_BREAKPOINTS: [(f64, f64); 10] = [
    (0.2, 0.7),
    (0.4, 0.8),
    (0.7, 0.9),
    (1.0, 1.0),
    (1.4, 1.1),
    (1.8, 1.2),
    (2.3, 1.3),
    (2.9, 1.4),
    (3.6, 1.5),
    (4.4, 1.6),
];

/// IPI for ratios above the last breakpoint
const IPI_CEILING: f64 = 1.7;

/// Discrete IPI for a ratio C
pub fn lookup_ipi(ratio: f64) -> f64 {
    IPI_BREAKPOINTS
        .iter()
        .find(|(upper, _)| ratio <= *upper)
        .map_or(IPI_CEILING, |(_, ipi)| *ipi)
}

/// Loss component indicator derived from the average annual loss
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorResult {
    pub average_annual_loss: f64,
    /// average_annual_loss x CAPITAL_MULTIPLIER
    pub capital_result: f64,
    /// capital_result / CIN, 0 when CIN <= 0
    pub ratio: f64,
    pub ipi: f64,
}

impl IndicatorResult {
    pub fn compute(average_annual_loss: f64, cin: f64) -> Self {
        let capital_result = average_annual_loss * CAPITAL_MULTIPLIER;
        let ratio = if cin > 0.0 { capital_result / cin } else { 0.0 };

        Self {
            average_annual_loss,
            capital_result,
            ratio,
            ipi: lookup_ipi(ratio),
        }
    }
}
