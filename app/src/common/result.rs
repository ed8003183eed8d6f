//! Common Result Type

use super::error::AppError;

/// Application result type
///
/// Every handler and API client returns this; the binary converts the error
/// into an `anyhow::Error` at the top level.
pub type AppResult<T> = Result<T, AppError>;
