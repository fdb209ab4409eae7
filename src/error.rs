use thiserror::Error;

use crate::schema::ValidationError;

/// Convenience result type for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type shared across the filter, validation and pipeline layers.
///
/// Filter parse errors are fatal to the filter's construction and surface
/// before any row is processed. Per-row errors (evaluation, validation,
/// amount parsing) are reported to the caller, which typically skips the row
/// and keeps streaming.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error (malformed input the reader cannot recover from).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A filter expression could not be parsed.
    #[error("invalid filter expression {expr:?}: {message}")]
    FilterParse { expr: String, message: String },

    /// A filter referenced a column index outside the record.
    #[error("column index {index} out of range (record has {len} columns)")]
    ColumnOutOfRange { index: usize, len: usize },

    /// The amount column could not be parsed into a number.
    #[error("invalid amount {raw:?} at column {index}: {message}")]
    InvalidAmount {
        index: usize,
        raw: String,
        message: String,
    },

    /// The record has fewer columns than the row layout requires.
    #[error("not enough columns, expected index {index} (record has {len} columns)")]
    MissingColumn { index: usize, len: usize },

    /// A record failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AnalysisError {
    pub(crate) fn filter_parse(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FilterParse {
            expr: expr.into(),
            message: message.into(),
        }
    }
}
