use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use sdb_core::Database;
use sdb_store::EntityStore;

use crate::handler;

/// Database handle shared by every request.
pub type SharedDatabase = Arc<Database<Box<dyn EntityStore>>>;

/// Build the axum router with all sdb endpoints.
pub fn build_router(db: SharedDatabase) -> Router {
    Router::new()
        .route("/", get(handler::home_handler))
        .route("/set", get(handler::set_handler))
        .route("/get", get(handler::get_handler))
        .route("/unset", get(handler::unset_handler))
        .route("/numequalto", get(handler::num_equal_to_handler))
        .route("/undo", get(handler::undo_handler))
        .route("/redo", get(handler::redo_handler))
        .route("/end", get(handler::end_handler))
        .route("/history", get(handler::history_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}
