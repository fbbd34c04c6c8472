//! Utilities
//!
//! - [`AppError`] / [`ApiResponse`] - from `shared::error`
//! - logging, input validation

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

