//! Store API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_superuser;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores", routes())
}

fn routes() -> Router<ServerState> {
    // Access to a single store is checked in the handlers
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/stock", get(handler::stock))
        .route("/{id}/stock/low", get(handler::low_stock));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/managers", put(handler::set_managers))
        .layer(middleware::from_fn(require_superuser));

    read_routes.merge(manage_routes)
}
