//! Register record structures matching the loss and recovery register formats

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Loss register column headers
pub mod loss_columns {
    pub const REFERENCE: &str = "Referencia";
    pub const REGISTRATION_DATE: &str = "Fecha_de_registro_contable";
    pub const GROSS_LOSS: &str = "Cuantia_bruta";
    pub const ACCOUNT_CATEGORY: &str = "Cuentas_catalogo_afectadas";
    pub const RISK_CLASS: &str = "Clase_de_riesgo_operacional_nivel_2";

    pub const REQUIRED: [&str; 5] = [
        REFERENCE,
        REGISTRATION_DATE,
        GROSS_LOSS,
        ACCOUNT_CATEGORY,
        RISK_CLASS,
    ];
}

/// Recovery register column headers
pub mod recovery_columns {
    pub const REFERENCE: &str = "Referencia";
    pub const RECOVERY_DATE: &str = "Fecha_de_recuperacion";
    pub const INSURANCE_RECOVERED: &str = "Cuantia_recuperada_por_seguros";
    pub const OTHER_RECOVERED: &str = "Cuantia_de_otras_recuperaciones";
    pub const ACCOUNT_CATEGORY: &str = "Cuentas_catalogo_afectadas";

    pub const REQUIRED: [&str; 5] = [
        REFERENCE,
        RECOVERY_DATE,
        INSURANCE_RECOVERED,
        OTHER_RECOVERED,
        ACCOUNT_CATEGORY,
    ];
}

/// A single row of the loss register
///
/// References are not unique: one event may be booked over several rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossEvent {
    /// Event reference (shared by all rows of the same event)
    pub reference: String,

    /// Accounting registration date
    pub registration_date: NaiveDate,

    /// Gross loss amount (0 when the cell was not numeric)
    pub gross_loss: f64,

    /// Affected account category
    pub account_category: String,

    /// Level-2 operational risk class code (e.g. 11, 72)
    pub risk_class_code: Option<u32>,
}

impl LossEvent {
    pub fn new(
        reference: impl Into<String>,
        registration_date: NaiveDate,
        gross_loss: f64,
        risk_class_code: Option<u32>,
    ) -> Self {
        Self {
            reference: reference.into(),
            registration_date,
            gross_loss,
            account_category: String::new(),
            risk_class_code,
        }
    }

    /// Set the affected account category
    pub fn with_account_category(mut self, category: impl Into<String>) -> Self {
        self.account_category = category.into();
        self
    }
}

/// A single row of the recoveries register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    /// Reference of the loss event this recovery belongs to
    pub reference: String,

    /// Date the recovery was booked
    pub recovery_date: Option<NaiveDate>,

    /// Amount recovered through insurance
    pub insurance_recovered: f64,

    /// Amount recovered through any other channel
    pub other_recovered: f64,

    /// Recovery account category
    pub account_category: Option<String>,
}

impl RecoveryRecord {
    pub fn new(
        reference: impl Into<String>,
        recovery_date: Option<NaiveDate>,
        insurance_recovered: f64,
        other_recovered: f64,
    ) -> Self {
        Self {
            reference: reference.into(),
            recovery_date,
            insurance_recovered,
            other_recovered,
            account_category: None,
        }
    }

    /// Set the recovery account category
    pub fn with_account_category(mut self, category: impl Into<String>) -> Self {
        self.account_category = Some(category.into());
        self
    }

    /// Total recovered on this row (insurance + other)
    pub fn recovery_amount(&self) -> f64 {
        self.insurance_recovered + self.other_recovered
    }
}
