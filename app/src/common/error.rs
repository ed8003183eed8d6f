//! Common Error Types
//!
//! Unified error handling with a small code taxonomy that maps HTTP statuses
//! from Google APIs and locally detected input problems onto one type.

use std::fmt;

use reqwest::StatusCode;

/// Error categories surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed flags, ranges, colors, JSON values
    InvalidInput,
    /// Unknown sheet, label, or resource (HTTP 404)
    NotFound,
    /// HTTP 403
    PermissionDenied,
    /// Missing access token or HTTP 401
    Unauthenticated,
    /// HTTP 429
    RateLimited,
    /// Any other non-success response from a Google API
    Api,
    /// Network failure before a response arrived
    Transport,
    /// Config file could not be read or parsed
    Config,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "invalid_input",
            ErrorCode::NotFound => "not_found",
            ErrorCode::PermissionDenied => "permission_denied",
            ErrorCode::Unauthenticated => "unauthenticated",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::Api => "api_error",
            ErrorCode::Transport => "transport_error",
            ErrorCode::Config => "config_error",
            ErrorCode::Internal => "internal_error",
        }
    }

    /// Map an HTTP status from a Google API onto an error code
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ErrorCode::InvalidInput,
            StatusCode::UNAUTHORIZED => ErrorCode::Unauthenticated,
            StatusCode::FORBIDDEN => ErrorCode::PermissionDenied,
            StatusCode::NOT_FOUND => ErrorCode::NotFound,
            StatusCode::TOO_MANY_REQUESTS => ErrorCode::RateLimited,
            _ => ErrorCode::Api,
        }
    }
}

/// Application error type
#[derive(Debug)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Create a missing parameter error
    pub fn missing_param(name: &str) -> Self {
        Self::invalid_input(format!("Missing required parameter: {}", name))
    }

    /// Create a sheet not found error
    pub fn sheet_not_found(title: &str) -> Self {
        Self::not_found(format!("sheet not found: {}", title))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

impl From<gw_a1::A1Error> for AppError {
    fn from(err: gw_a1::A1Error) -> Self {
        Self::invalid_input(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(ErrorCode::Transport, format!("HTTP request failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = AppError::sheet_not_found("Sheet9");
        assert_eq!(err.to_string(), "[not_found] sheet not found: Sheet9");
    }

    #[test]
    fn test_from_status() {
        assert_eq!(ErrorCode::from_status(StatusCode::NOT_FOUND), ErrorCode::NotFound);
        assert_eq!(ErrorCode::from_status(StatusCode::FORBIDDEN), ErrorCode::PermissionDenied);
        assert_eq!(ErrorCode::from_status(StatusCode::TOO_MANY_REQUESTS), ErrorCode::RateLimited);
        assert_eq!(ErrorCode::from_status(StatusCode::BAD_GATEWAY), ErrorCode::Api);
    }

    #[test]
    fn test_a1_error_is_invalid_input() {
        let err: AppError = gw_a1::parse_cell_range("A1").unwrap_err().into();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("invalid range format"));
    }
}
