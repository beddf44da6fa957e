//! Error type for preprocessing operations.

use thiserror::Error;

/// Errors raised while preparing records or fitting/applying transformers.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// Every row was dropped by the missing-target filter.
    #[error("no trainable rows: every record is missing the target column '{target}'")]
    NoTrainableRows { target: String },

    /// Non-empty input was required.
    #[error("empty data: {0}")]
    EmptyData(String),

    /// A column the fitted transformer expects is absent.
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// A column's type at transform time disagrees with the type seen at fit time.
    #[error("column '{column}' type mismatch: fitted as {expected}, got {got}")]
    ColumnTypeMismatch {
        column: String,
        expected: &'static str,
        got: &'static str,
    },

    /// Columns of a table disagree on row count.
    #[error("ragged columns: expected {expected} rows, got {got} in column {column}")]
    RaggedColumns {
        expected: usize,
        got: usize,
        column: String,
    },

    /// Matrix width disagrees with the fitted transformer.
    #[error("feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },
}
