//! Routing handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, warn};
use zuklink_domain::routing::RoutingError;

use crate::{
    dto::routing::{
        ErrorResponse, ExternalViewChangeRequest, RoutingBuildResponse, RoutingTablesResponse,
        TableListResponse,
    },
    error::BrokerError,
    AppState,
};

/// Handle an external view change for a table
#[utoipa::path(
    put,
    path = "/tables/{table}/external-view",
    params(("table" = String, Path, description = "Table name, e.g. events_REALTIME")),
    request_body = ExternalViewChangeRequest,
    responses(
        (status = 200, description = "Routing tables rebuilt", body = RoutingBuildResponse),
        (status = 400, description = "Bad request - view does not match table", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "routing"
)]
pub async fn external_view_change_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(payload): Json<ExternalViewChangeRequest>,
) -> Response {
    info!(
        table = %table,
        segments = payload.segments.len(),
        instances = payload.instances.len(),
        "Received external view change"
    );

    let (external_view, instances) = payload.into_domain(&table);

    match state
        .routing_service
        .on_external_view_change(&table, external_view, instances)
        .await
    {
        Ok(tables) => (
            StatusCode::OK,
            Json(RoutingBuildResponse::from(tables.as_ref())),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// Return the current routing tables of a table
#[utoipa::path(
    get,
    path = "/debug/routing-tables/{table}",
    params(("table" = String, Path, description = "Table name")),
    responses(
        (status = 200, description = "Current routing tables", body = RoutingTablesResponse),
        (status = 404, description = "No routing tables for this table", body = ErrorResponse)
    ),
    tag = "routing"
)]
pub async fn routing_tables_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Response {
    match state.routing_service.routing_tables(&table).await {
        Ok(tables) => Json(RoutingTablesResponse::from(tables.as_ref())).into_response(),
        Err(err) => error_response(err),
    }
}

/// Forget the routing tables of a table
#[utoipa::path(
    delete,
    path = "/tables/{table}",
    params(("table" = String, Path, description = "Table name")),
    responses(
        (status = 204, description = "Routing tables dropped"),
        (status = 404, description = "No routing tables for this table", body = ErrorResponse)
    ),
    tag = "routing"
)]
pub async fn drop_table_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Response {
    if state.routing_service.drop_table(&table).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(BrokerError::UnknownTable(table))
    }
}

/// List tables that currently have routing tables
#[utoipa::path(
    get,
    path = "/tables",
    responses(
        (status = 200, description = "Routed tables, sorted by name", body = TableListResponse)
    ),
    tag = "routing"
)]
pub async fn list_tables_handler(State(state): State<AppState>) -> Json<TableListResponse> {
    Json(TableListResponse {
        tables: state.routing_service.table_names().await,
    })
}

fn error_response(err: BrokerError) -> Response {
    let status = match &err {
        BrokerError::Routing(
            RoutingError::InvalidConfig { .. } | RoutingError::TableMismatch { .. },
        ) => StatusCode::BAD_REQUEST,
        BrokerError::UnknownTable(_) => StatusCode::NOT_FOUND,
        BrokerError::Routing(RoutingError::BuildFailed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!(error = ?err, "Routing request failed");
    } else {
        warn!(error = %err, "Rejected routing request");
    }

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
