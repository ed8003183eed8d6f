//! Common Utilities
//!
//! Shared error types, result alias, HTTP client construction and paths.

pub mod error;
pub mod http;
pub mod paths;
pub mod result;

pub use error::{AppError, ErrorCode};
pub use http::create_http_client;
pub use paths::{config_path, gw_dir};
pub use result::AppResult;
