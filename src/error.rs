//! Ошибки библиотеки

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DslrError {
    #[error("{operation}: empty input")]
    EmptyInput { operation: &'static str },

    #[error("{operation}: column '{column}' has no values")]
    EmptyColumn {
        column: String,
        operation: &'static str,
    },

    /// max == min, нормализация делила бы на ноль
    #[error("column '{column}' is degenerate (max == min), cannot normalize")]
    DegenerateColumn { column: String },

    #[error("{what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("percentile {0} is outside [0, 100]")]
    InvalidPercentile(f64),

    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    #[error("row {row}: unknown house '{value}'")]
    UnknownHouse { row: usize, value: String },

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("unknown gradient descent method '{0}', expected one of: batch, mini_batch, sgd")]
    UnknownMethod(String),

    #[error("model not fitted")]
    NotFitted,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DslrError>;
