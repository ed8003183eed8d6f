use thiserror::Error;

/// Errors produced while parsing A1 notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum A1Error {
    #[error("invalid cell reference: {0:?}")]
    InvalidCellRef(String),

    #[error("invalid range format: {0:?} (expected e.g. A1:D10)")]
    InvalidRange(String),

    #[error("invalid column letters: {0:?}")]
    InvalidColumn(String),

    #[error("invalid row number: {0:?}")]
    InvalidRow(String),
}
