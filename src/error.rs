//! Fatal evaluation errors.
//!
//! Anything that means a candidate cannot be evaluated at all (malformed
//! output table, wrong variable count, bad configuration) surfaces as an
//! [`EvalError`]. Comfort-model domain errors live in
//! [`crate::comfort::ComfortError`] instead, since those are expected
//! per-sample outcomes rather than broken inputs.

use thiserror::Error;

use crate::config::ConfigError;

/// Convenience alias for fallible evaluation operations.
pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("expected {expected} optimization variables, got {actual}")]
    VariableLength { expected: usize, actual: usize },

    #[error("optimization variable {index} is not finite: {value}")]
    NonFiniteVariable { index: usize, value: f64 },

    #[error("schedule of length {length} cannot hold {variables} variables from offset {offset}")]
    ScheduleLayout {
        offset: usize,
        variables: usize,
        length: usize,
    },

    #[error("schedule has {actual} slots, expected {expected}")]
    ScheduleLength { expected: usize, actual: usize },

    #[error("table row {row} has {actual} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("column {column} out of range for table with {columns} columns")]
    ColumnOutOfRange { column: usize, columns: usize },

    #[error("row {row} out of range for table with {rows} rows")]
    RowOutOfRange { row: usize, rows: usize },

    #[error("window [{start}, {end}] is empty")]
    EmptyWindow { start: usize, end: usize },

    #[error("no {0} columns configured")]
    NoColumns(&'static str),

    #[error("cannot parse \"{value}\" at row {row}, column {column} as a number")]
    Parse {
        row: usize,
        column: usize,
        value: String,
    },

    #[error("{0} contains no data")]
    EmptyInput(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
