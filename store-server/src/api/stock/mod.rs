//! Stock API module
//!
//! Store access is checked per request against the line's store.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stock", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/entries", post(handler::register_entry))
        .route("/exits", post(handler::register_exit))
        .route("/movements", get(handler::list_movements))
        .route("/{id}", put(handler::adjust))
}
