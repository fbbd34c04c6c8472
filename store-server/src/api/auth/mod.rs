//! Authentication routes

mod handler;

use axum::{Router, routing::get, routing::post, routing::put};

use crate::core::ServerState;

/// - /api/auth/login: public (skipped by `require_auth`)
/// - /api/auth/me, /api/auth/me/password: any logged-in account
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/me/password", put(handler::change_password))
}
