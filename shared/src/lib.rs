//! Shared types for the store management server
//!
//! Error system, domain models and DTOs, money helpers, and small
//! utilities used by `store-server` and its API clients.

pub mod client;
pub mod error;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
