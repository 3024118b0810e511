//! Error types for loading registers and running the calculation
//!
//! Only structural problems are errors. Malformed numeric cells and missing
//! recovery data are defaulted by the loaders and never reach this type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IpiError {
    #[error("{dataset}: required column '{column}' is missing")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },

    #[error("{dataset}: unreadable date '{value}' at line {line}")]
    InvalidDate {
        dataset: &'static str,
        line: u64,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for calculator operations.
pub type IpiResult<T> = Result<T, IpiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_names_column() {
        let err = IpiError::MissingColumn {
            dataset: "loss register",
            column: "Cuantia_bruta",
        };
        let msg = err.to_string();
        assert!(msg.contains("Cuantia_bruta"));
        assert!(msg.contains("loss register"));
    }
}
