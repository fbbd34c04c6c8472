//! Data models
//!
//! Shared between store-server and API clients.
//! Rows without money columns use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! money is `Decimal` here and integer cents in the database, so those rows are
//! converted by the repositories.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod account;
pub mod balance;
pub mod catalog;
pub mod daily_report;
pub mod sale;
pub mod stock;
pub mod stock_movement;
pub mod store;

// Re-exports
pub use account::*;
pub use balance::*;
pub use catalog::*;
pub use daily_report::*;
pub use sale::*;
pub use stock::*;
pub use stock_movement::*;
pub use store::*;
