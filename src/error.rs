use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("Duplicate leaf code '{code}' in {hierarchy} hierarchy ({occurrences} rows)")]
    DuplicateLeafCode {
        hierarchy: &'static str,
        code: String,
        occurrences: usize,
    },

    #[error("Value '{value}' is not an available option at {hierarchy} level {level}")]
    SelectionOutOfRange {
        hierarchy: &'static str,
        level: usize,
        value: String,
    },

    #[error("Level {level} out of range for {hierarchy} hierarchy (depth {depth})")]
    InvalidLevel {
        hierarchy: &'static str,
        level: usize,
        depth: usize,
    },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid selection mode: '{0}'. Must be 'include', 'exclude' or 'none'")]
    InvalidSelectionMode(String),

    #[error("Unknown hierarchy: '{0}'. Must be 'activity' or 'legal_category'")]
    UnknownHierarchy(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

#[cfg(feature = "python")]
impl From<ExplorerError> for pyo3::PyErr {
    fn from(err: ExplorerError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyRuntimeError, PyValueError};
        match err {
            ExplorerError::SelectionOutOfRange { .. }
            | ExplorerError::InvalidLevel { .. }
            | ExplorerError::InvalidDateRange { .. }
            | ExplorerError::InvalidSelectionMode(_)
            | ExplorerError::UnknownHierarchy(_) => PyValueError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}
