//! Report output: dashboard summaries, CSV artifacts and the JSON bundle
//!
//! CSV artifacts mirror the sheets of the regulatory workbook:
//! `resumen_ejecutivo.csv` (consolidated table), `eventos_sobre_umbral.csv`,
//! `data_procesada.csv` and `resultados_ipi.csv`.

use crate::calculation::{CalculationResult, ConsolidatedTable, ThresholdClass};
use crate::error::IpiResult;
use csv::Writer;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const CONSOLIDATED_FILE: &str = "resumen_ejecutivo.csv";
pub const OVER_THRESHOLD_FILE: &str = "eventos_sobre_umbral.csv";
pub const EVENTS_FILE: &str = "data_procesada.csv";
pub const INDICATOR_FILE: &str = "resultados_ipi.csv";
pub const JSON_FILE: &str = "reporte_ipi.json";

/// Net loss of all windowed events in one band (bar chart source)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandLoss {
    pub band: u32,
    pub net_loss: f64,
}

/// Net loss of all events with one classification (pie chart source)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassLoss {
    pub threshold_class: ThresholdClass,
    pub events: usize,
    pub net_loss: f64,
}

/// Figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub loss_by_band: Vec<BandLoss>,
    pub loss_by_class: Vec<ClassLoss>,
    pub average_annual_loss: f64,
    pub capital_result: f64,
    pub ratio: f64,
    pub ipi: f64,
}

impl DashboardSummary {
    pub fn from_result(result: &CalculationResult) -> Self {
        let mut by_band: BTreeMap<u32, f64> = BTreeMap::new();
        for e in &result.events {
            *by_band.entry(e.band).or_insert(0.0) += e.event.net_loss;
        }

        let loss_by_class = [ThresholdClass::A, ThresholdClass::B, ThresholdClass::NotApplicable]
            .into_iter()
            .filter_map(|class| {
                let rows: Vec<f64> = result
                    .events
                    .iter()
                    .filter(|e| e.threshold_class == class)
                    .map(|e| e.event.net_loss)
                    .collect();
                (!rows.is_empty()).then(|| ClassLoss {
                    threshold_class: class,
                    events: rows.len(),
                    net_loss: rows.iter().sum(),
                })
            })
            .collect();

        Self {
            loss_by_band: by_band
                .into_iter()
                .map(|(band, net_loss)| BandLoss { band, net_loss })
                .collect(),
            loss_by_class,
            average_annual_loss: result.indicator.average_annual_loss,
            capital_result: result.indicator.capital_result,
            ratio: result.indicator.ratio,
            ipi: result.indicator.ipi,
        }
    }
}

/// JSON report bundle
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Reporting period label (YYYY-MM)
    pub period: Option<&'a str>,
    pub dashboard: DashboardSummary,
    #[serde(flatten)]
    pub result: &'a CalculationResult,
}

impl<'a> Report<'a> {
    pub fn new(result: &'a CalculationResult, period: Option<&'a str>) -> Self {
        Self {
            period,
            dashboard: DashboardSummary::from_result(result),
            result,
        }
    }

    pub fn to_json(&self) -> IpiResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

/// Consolidated table: one row per type plus TOTAL, one column per band plus TOTAL
pub fn write_consolidated_table<W: Write>(writer: W, table: &ConsolidatedTable) -> IpiResult<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec![String::new()];
    header.extend(table.bands.iter().map(|b| b.to_string()));
    header.push(ConsolidatedTable::TOTAL_LABEL.to_string());
    wtr.write_record(&header)?;

    for row in table.rows() {
        let mut record = vec![row.label.to_string()];
        record.extend(row.by_band.iter().map(|v| money(*v)));
        record.push(money(row.total));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// (band, reference) pairs above the threshold
pub fn write_over_threshold<W: Write>(writer: W, result: &CalculationResult) -> IpiResult<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["Año_banda", "Referencia", "Pérdida neta"])?;
    for pair in &result.over_threshold {
        wtr.write_record([pair.band.to_string(), pair.reference.clone(), money(pair.net_loss)])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Every windowed event with recoveries, band and classification
pub fn write_events<W: Write>(writer: W, result: &CalculationResult) -> IpiResult<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record([
        "Referencia",
        "Fecha_de_registro_contable",
        "Fecha_de_recuperacion",
        "Cuantia_bruta",
        "Cuantia_recuperada",
        "Pérdida neta",
        "Clase_de_riesgo_operacional_nivel_2",
        "Cuentas_catalogo_afectadas",
        "Cuentas Catálogo Recuperación",
        "Año_banda",
        "Tipo de umbral",
    ])?;

    for row in &result.events {
        let e = &row.event;
        wtr.write_record([
            e.reference.clone(),
            e.registration_date.to_string(),
            e.recovery_date.map(|d| d.to_string()).unwrap_or_default(),
            money(e.gross_loss),
            money(e.recovered),
            money(e.net_loss),
            row.risk_category.unwrap_or_default().to_string(),
            e.account_category.clone(),
            e.recovery_account_category.clone(),
            row.band.to_string(),
            row.threshold_class.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Metric / value rows for capital result, C and IPI
pub fn write_indicator<W: Write>(writer: W, result: &CalculationResult) -> IpiResult<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["Métrica", "Valor"])?;
    wtr.write_record(["Promedio anual".to_string(), money(result.indicator.average_annual_loss)])?;
    wtr.write_record(["CP (Promedio x 15)".to_string(), money(result.indicator.capital_result)])?;
    wtr.write_record(["Cociente (C)".to_string(), format!("{:.6}", result.indicator.ratio)])?;
    wtr.write_record(["IPI Asignado".to_string(), format!("{:.1}", result.indicator.ipi)])?;
    wtr.flush()?;
    Ok(())
}

/// Write every artifact plus the JSON bundle into `dir`, creating it if needed
pub fn write_reports(dir: &Path, result: &CalculationResult, period: Option<&str>) -> IpiResult<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let consolidated = dir.join(CONSOLIDATED_FILE);
    write_consolidated_table(fs::File::create(&consolidated)?, &result.table)?;

    let over_threshold = dir.join(OVER_THRESHOLD_FILE);
    write_over_threshold(fs::File::create(&over_threshold)?, result)?;

    let events = dir.join(EVENTS_FILE);
    write_events(fs::File::create(&events)?, result)?;

    let indicator = dir.join(INDICATOR_FILE);
    write_indicator(fs::File::create(&indicator)?, result)?;

    let json = dir.join(JSON_FILE);
    fs::write(&json, Report::new(result, period).to_json()?)?;

    let written = vec![consolidated, over_threshold, events, indicator, json];
    info!("Wrote {} report files to {}", written.len(), dir.display());
    Ok(written)
}
