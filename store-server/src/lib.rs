//! Store Server - multi-store retail management backend
//!
//! # Overview
//!
//! - **Database** (`db`): SQLite pool, migrations and repositories
//! - **Auth** (`auth`): JWT + Argon2, superuser / store manager roles
//! - **Services** (`services`): sales and stock mutations
//! - **Balance** (`balance`): period aggregation of sales and daily reports
//! - **HTTP API** (`api`): JSON REST endpoints
//!
//! # Layout
//!
//! ```text
//! store-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT, passwords, middleware, store access
//! ├── db/            # DbService + repositories
//! ├── services/      # sales, stock
//! ├── balance/       # ledgers, aggregator, persistence flow
//! ├── api/           # routers and handlers
//! └── utils/         # errors, logger, validation
//! ```

pub mod api;
pub mod auth;
pub mod balance;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{LoggerGuard, init_logger};

// Security logging macro - supports tracing format specifiers
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env` and initialize logging.
///
/// The returned guard must live as long as the process when file logging is on.
pub fn setup_environment(config: &Config) -> LoggerGuard {
    init_logger(
        &config.log_level,
        config.log_json,
        config.log_dir.as_deref(),
    )
}
