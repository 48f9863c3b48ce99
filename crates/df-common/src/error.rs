//! Error types for DataFlame.

use thiserror::Error;

/// Result type alias for DataFlame operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for DataFlame.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Data errors (20-29)
    #[error("unacceptable label {label} in column '{column}'")]
    UnacceptableLabel { column: String, label: String },

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{column}' row {row}: expected {expected}, found {found}")]
    ColumnType {
        column: String,
        row: usize,
        expected: &'static str,
        found: String,
    },

    #[error("row has {actual} values but the table has {expected} columns")]
    RowArity { expected: usize, actual: usize },

    // Invariant violations (30-39)
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::UnacceptableLabel { .. } => 20,
            Error::MissingColumn(_) => 21,
            Error::ColumnType { .. } => 22,
            Error::RowArity { .. } => 23,
            Error::InternalConsistency(_) => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Whether the caller's data, rather than its parameters, caused the failure.
    pub fn is_data_error(&self) -> bool {
        (20..30).contains(&self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unacceptable_label_names_column_and_label() {
        let err = Error::UnacceptableLabel {
            column: "tag".to_string(),
            label: "C".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("label C"));
        assert!(msg.contains("'tag'"));
        assert_eq!(err.code(), 20);
        assert!(err.is_data_error());
    }

    #[test]
    fn config_is_not_data_error() {
        assert!(!Error::Config("bad".into()).is_data_error());
        assert!(!Error::InternalConsistency("bad".into()).is_data_error());
    }
}
