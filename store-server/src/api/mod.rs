//! API routes
//!
//! # Layout
//!
//! - [`health`] - liveness and database check
//! - [`auth`] - login and current account
//! - [`accounts`] - account management (superuser)
//! - [`stores`] - stores, managers, statistics and stock views
//! - [`products`] / [`recharges`] - catalog
//! - [`stock`] - entries, exits, adjustments and movements
//! - [`sales`] - point of sale
//! - [`daily_reports`] - end-of-day tallies
//! - [`balances`] - period balances

use axum::Router;

use crate::core::ServerState;

pub mod accounts;
pub mod auth;
pub mod balances;
pub mod daily_reports;
pub mod health;
pub mod products;
pub mod recharges;
pub mod sales;
pub mod stock;
pub mod stores;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// Every route, without layers or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(accounts::router())
        .merge(stores::router())
        .merge(products::router())
        .merge(recharges::router())
        .merge(stock::router())
        .merge(sales::router())
        .merge(daily_reports::router())
        .merge(balances::router())
}
