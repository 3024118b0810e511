//! Load loss and recovery registers from CSV
//!
//! Header names are checked up front so a missing column aborts with a
//! structural error. Cell values are read leniently: numeric cells that do
//! not parse become 0 and are counted in a warning.

use super::data::{loss_columns, recovery_columns};
use super::{LossEvent, RecoveryRecord};
use crate::error::{IpiError, IpiResult};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use std::io::Read;
use std::path::Path;

const LOSS_DATASET: &str = "loss register";
const RECOVERY_DATASET: &str = "recovery register";

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Parse a monetary cell, `None` when the cell is not a finite number
pub fn parse_amount(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a date cell in ISO (optionally with time) or day-first form.
/// Any time of day is dropped; registers are compared at day granularity.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Parse a risk class code written either as `11` or as `11.0`
pub fn parse_risk_code(raw: &str) -> Option<u32> {
    let value = parse_amount(raw)?;
    if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

/// Resolve required column positions, failing on the first missing header
fn column_positions<const N: usize>(
    headers: &StringRecord,
    dataset: &'static str,
    required: [&'static str; N],
) -> IpiResult<[usize; N]> {
    let mut positions = [0usize; N];
    for (slot, column) in positions.iter_mut().zip(required) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or(IpiError::MissingColumn { dataset, column })?;
    }
    Ok(positions)
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Load the loss register from any reader (e.g., file, string buffer)
pub fn load_loss_register_from_reader<R: Read>(reader: R) -> IpiResult<Vec<LossEvent>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let [reference, date, gross, account, risk] =
        column_positions(&headers, LOSS_DATASET, loss_columns::REQUIRED)?;

    let mut events = Vec::new();
    let mut defaulted_amounts = 0usize;
    let mut unmapped_codes = 0usize;

    for result in csv_reader.records() {
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let registration_date = parse_date(cell(date)).ok_or_else(|| IpiError::InvalidDate {
            dataset: LOSS_DATASET,
            line: line_of(&record),
            value: cell(date).to_string(),
        })?;

        let gross_loss = parse_amount(cell(gross)).unwrap_or_else(|| {
            defaulted_amounts += 1;
            0.0
        });

        let risk_class_code = parse_risk_code(cell(risk));
        if risk_class_code.is_none() {
            unmapped_codes += 1;
        }

        events.push(LossEvent {
            reference: cell(reference).to_string(),
            registration_date,
            gross_loss,
            account_category: cell(account).to_string(),
            risk_class_code,
        });
    }

    if defaulted_amounts > 0 {
        warn!("{}: {} gross loss cells were not numeric and count as 0", LOSS_DATASET, defaulted_amounts);
    }
    if unmapped_codes > 0 {
        warn!("{}: {} rows carry no readable risk class code", LOSS_DATASET, unmapped_codes);
    }
    debug!("{}: loaded {} rows", LOSS_DATASET, events.len());

    Ok(events)
}

/// Load the recoveries register from any reader
pub fn load_recovery_register_from_reader<R: Read>(reader: R) -> IpiResult<Vec<RecoveryRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let [reference, date, insurance, other, account] =
        column_positions(&headers, RECOVERY_DATASET, recovery_columns::REQUIRED)?;

    let mut records = Vec::new();
    let mut defaulted_amounts = 0usize;

    for result in csv_reader.records() {
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let mut amount = |idx: usize| {
            parse_amount(cell(idx)).unwrap_or_else(|| {
                defaulted_amounts += 1;
                0.0
            })
        };
        let insurance_recovered = amount(insurance);
        let other_recovered = amount(other);

        let account_category = Some(cell(account))
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        records.push(RecoveryRecord {
            reference: cell(reference).to_string(),
            recovery_date: parse_date(cell(date)),
            insurance_recovered,
            other_recovered,
            account_category,
        });
    }

    if defaulted_amounts > 0 {
        warn!("{}: {} recovered amount cells were not numeric and count as 0", RECOVERY_DATASET, defaulted_amounts);
    }
    debug!("{}: loaded {} rows", RECOVERY_DATASET, records.len());

    Ok(records)
}

/// Load the loss register from a CSV file
pub fn load_loss_register<P: AsRef<Path>>(path: P) -> IpiResult<Vec<LossEvent>> {
    let file = std::fs::File::open(path)?;
    load_loss_register_from_reader(file)
}

/// Load the recoveries register from a CSV file
pub fn load_recovery_register<P: AsRef<Path>>(path: P) -> IpiResult<Vec<RecoveryRecord>> {
    let file = std::fs::File::open(path)?;
    load_recovery_register_from_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOSS_CSV: &str = "\
Referencia,Fecha_de_registro_contable,Cuantia_bruta,Cuentas_catalogo_afectadas,Clase_de_riesgo_operacional_nivel_2
ERO-001,2023-03-15,1500000.50,510505,21
ERO-001,2023-04-02 00:00:00,abc,510505,21.0
ERO-002,15/11/2022,,519095,
";

    const RECOVERY_CSV: &str = "\
Referencia,Fecha_de_recuperacion,Cuantia_recuperada_por_seguros,Cuantia_de_otras_recuperaciones,Cuentas_catalogo_afectadas
ERO-001,2023-06-30,1000,n/a,429505
ERO-002,,250.25,10,
";

    #[test]
    fn test_load_loss_register_tolerant_cells() {
        let events = load_loss_register_from_reader(LOSS_CSV.as_bytes()).unwrap();
        assert_eq!(events.len(), 3);

        assert_eq!(events[0].reference, "ERO-001");
        assert_eq!(events[0].gross_loss, 1_500_000.50);
        assert_eq!(events[0].risk_class_code, Some(21));

        // Malformed amount becomes 0, float-formatted code still reads
        assert_eq!(events[1].gross_loss, 0.0);
        assert_eq!(events[1].risk_class_code, Some(21));
        assert_eq!(events[1].registration_date, NaiveDate::from_ymd_opt(2023, 4, 2).unwrap());

        // Day-first date, blank amount and blank code
        assert_eq!(events[2].registration_date, NaiveDate::from_ymd_opt(2022, 11, 15).unwrap());
        assert_eq!(events[2].gross_loss, 0.0);
        assert_eq!(events[2].risk_class_code, None);
    }

    #[test]
    fn test_load_recovery_register_tolerant_cells() {
        let records = load_recovery_register_from_reader(RECOVERY_CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].recovery_amount(), 1000.0);
        assert_eq!(records[0].account_category.as_deref(), Some("429505"));

        assert_eq!(records[1].recovery_date, None);
        assert_eq!(records[1].recovery_amount(), 260.25);
        assert_eq!(records[1].account_category, None);
    }

    #[test]
    fn test_missing_column_is_structural_error() {
        let csv = "Referencia,Fecha_de_registro_contable,Cuentas_catalogo_afectadas,Clase_de_riesgo_operacional_nivel_2\n\
                   ERO-1,2023-01-01,5105,11\n";
        let err = load_loss_register_from_reader(csv.as_bytes()).unwrap_err();
        match err {
            IpiError::MissingColumn { column, .. } => assert_eq!(column, "Cuantia_bruta"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_recovery_column_is_structural_error() {
        let csv = "Referencia,Fecha_de_recuperacion,Cuantia_recuperada_por_seguros,Cuentas_catalogo_afectadas\n";
        let err = load_recovery_register_from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Cuantia_de_otras_recuperaciones"));
    }

    #[test]
    fn test_unreadable_loss_date_is_rejected() {
        let csv = "Referencia,Fecha_de_registro_contable,Cuantia_bruta,Cuentas_catalogo_afectadas,Clase_de_riesgo_operacional_nivel_2\n\
                   ERO-1,not-a-date,100,5105,11\n";
        let err = load_loss_register_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IpiError::InvalidDate { line: 2, .. }));
    }

    #[test]
    fn test_time_of_day_is_ignored_by_the_window() {
        use crate::calculation::filter_window;

        let csv = "Referencia,Fecha_de_registro_contable,Cuantia_bruta,Cuentas_catalogo_afectadas,Clase_de_riesgo_operacional_nivel_2\n\
                   LATE,2024-06-30 15:00:00,100,5105,11\n\
                   EDGE,2019-06-30 10:00:00,100,5105,11\n\
                   OUT,2019-06-29 23:59:59,100,5105,11\n";
        let events = load_loss_register_from_reader(csv.as_bytes()).unwrap();
        let (window, kept) = filter_window(&events);

        let window = window.unwrap();
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2019, 6, 30).unwrap());
        let refs: Vec<&str> = kept.iter().map(|e| e.reference.as_str()).collect();
        assert_eq!(refs, vec!["LATE", "EDGE"]);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!(parse_amount(" 12.5 "), Some(12.5));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_risk_code("78"), Some(78));
        assert_eq!(parse_risk_code("7.5"), None);
        assert_eq!(parse_risk_code("-3"), None);
        assert_eq!(parse_date("2024-02-29T10:30:00"), NaiveDate::from_ymd_opt(2024, 2, 29));
    }
}
