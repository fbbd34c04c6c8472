//! Balance API module
//!
//! | Path | Method | Notes |
//! |------|--------|-------|
//! | /api/balances | GET | `kind`, `store_id`, `year`, `month` filters |
//! | /api/balances/generate | POST | current daily/weekly/monthly/yearly period |
//! | /api/balances/custom | POST | explicit range, one per store and start date |
//! | /api/balances/preview | GET | recompute without saving |
//! | /api/balances/{id} | GET, DELETE | GET refreshes the stored snapshot |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/balances", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/generate", post(handler::generate))
        .route("/custom", post(handler::create_custom))
        .route("/preview", get(handler::preview))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
}
