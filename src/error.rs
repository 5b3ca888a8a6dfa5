//! # Error Types
//!
//! Every fallible operation in the crate returns [`HindcastResult`]. The
//! evaluator itself only produces the first four variants; the remaining ones
//! come from loading inputs and configuration.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while preparing inputs or scoring a hindcast
#[derive(Error, Debug)]
pub enum HindcastError {
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Least-squares solver failed: {0}")]
    Solver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    #[error("Missing value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{input}': {reason}")]
    DateParse { input: String, reason: String },
}

/// Result type for hindcast operations
pub type HindcastResult<T> = Result<T, HindcastError>;

impl HindcastError {
    pub(crate) fn mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        HindcastError::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn invalid(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        HindcastError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for HindcastError {
    fn from(error: serde_json::Error) -> Self {
        HindcastError::Config(format!("JSON: {}", error))
    }
}

impl From<serde_yaml::Error> for HindcastError {
    fn from(error: serde_yaml::Error) -> Self {
        HindcastError::Config(format!("YAML: {}", error))
    }
}
