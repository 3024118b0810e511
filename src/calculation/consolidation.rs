//! Consolidated band x type table

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One row of the consolidated table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub label: &'static str,
    /// Values aligned with `ConsolidatedTable::bands`
    pub by_band: Vec<f64>,
    /// Row sum (TOTAL column)
    pub total: f64,
}

impl TableRow {
    fn new(label: &'static str, by_band: Vec<f64>) -> Self {
        let total = by_band.iter().sum();
        Self { label, by_band, total }
    }
}

/// Type A / Type B losses per band with TOTAL row and column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedTable {
    /// Bands present in either total, ascending
    pub bands: Vec<u32>,
    pub type_a: TableRow,
    pub type_b: TableRow,
    /// Column sums; `total.total` is the grand total
    pub total: TableRow,
}

impl ConsolidatedTable {
    pub const TYPE_A_LABEL: &'static str = "Tipo A";
    pub const TYPE_B_LABEL: &'static str = "Tipo B";
    pub const TOTAL_LABEL: &'static str = "TOTAL";

    /// Build from per-band totals, filling bands missing on one side with 0
    pub fn build(type_a_by_band: &BTreeMap<u32, f64>, type_b_by_band: &BTreeMap<u32, f64>) -> Self {
        let bands: Vec<u32> = type_a_by_band
            .keys()
            .chain(type_b_by_band.keys())
            .copied()
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect();

        let row = |totals: &BTreeMap<u32, f64>| -> Vec<f64> {
            bands.iter().map(|b| totals.get(b).copied().unwrap_or(0.0)).collect()
        };

        let type_a = TableRow::new(Self::TYPE_A_LABEL, row(type_a_by_band));
        let type_b = TableRow::new(Self::TYPE_B_LABEL, row(type_b_by_band));

        let column_sums: Vec<f64> = type_a
            .by_band
            .iter()
            .zip(&type_b.by_band)
            .map(|(a, b)| a + b)
            .collect();
        let total = TableRow {
            label: Self::TOTAL_LABEL,
            by_band: column_sums,
            total: type_a.total + type_b.total,
        };

        Self { bands, type_a, type_b, total }
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Rows in display order: Type A, Type B, TOTAL
    pub fn rows(&self) -> [&TableRow; 3] {
        [&self.type_a, &self.type_b, &self.total]
    }

    pub fn grand_total(&self) -> f64 {
        self.total.total
    }

    /// Mean of the per-band totals (TOTAL column excluded), 0 with no bands
    pub fn average_annual_loss(&self) -> f64 {
        if self.bands.is_empty() {
            return 0.0;
        }
        self.total.by_band.iter().sum::<f64>() / self.bands.len() as f64
    }
}
