//! Account API module (superuser only)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::require_superuser;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/accounts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/active", put(handler::set_active))
        .route("/{id}/password", put(handler::reset_password))
        .route("/{id}/stats", get(handler::stats))
        .layer(middleware::from_fn(require_superuser))
}
