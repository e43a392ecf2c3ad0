//! Routing routes

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::{
    handlers::routing::{
        drop_table_handler, external_view_change_handler, list_tables_handler,
        routing_tables_handler,
    },
    AppState,
};

/// Create routing routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tables", get(list_tables_handler))
        .route("/tables/:table/external-view", put(external_view_change_handler))
        .route("/tables/:table", delete(drop_table_handler))
        .route("/debug/routing-tables/:table", get(routing_tables_handler))
}
