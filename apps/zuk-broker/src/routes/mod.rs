//! API routes

pub mod routing;

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    dto::routing::{
        ErrorResponse, ExternalViewChangeRequest, InstanceConfigDto, RoutingBuildResponse,
        RoutingTablesResponse, TableListResponse,
    },
    handlers, AppState,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::routing::external_view_change_handler,
        handlers::routing::routing_tables_handler,
        handlers::routing::drop_table_handler,
        handlers::routing::list_tables_handler,
        health_handler
    ),
    components(
        schemas(
            ExternalViewChangeRequest,
            InstanceConfigDto,
            RoutingBuildResponse,
            RoutingTablesResponse,
            TableListResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "routing", description = "Routing table maintenance and debugging"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "ZukBroker API",
        version = "0.1.0",
        description = "Query routing service for ZukLink streaming tables",
        contact(
            name = "ZukLink Team"
        )
    )
)]
pub struct ApiDoc;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routing::routes())
        .route("/health", axum::routing::get(health_handler))
        .with_state(state)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = String)
    ),
    tag = "health"
)]
async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::RoutingService;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tower::ServiceExt;
    use zuklink_domain::routing::{LowLevelConsumerRoutingTableBuilder, RoutingSettings};

    fn app() -> Router {
        let builder = LowLevelConsumerRoutingTableBuilder::with_settings(RoutingSettings {
            table_count: 4,
            random_seed: Some(17),
        });
        create_router(AppState {
            routing_service: Arc::new(RoutingService::new(builder)),
        })
    }

    fn request(method: Method, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn external_view_body() -> serde_json::Value {
        serde_json::json!({
            "segments": {
                "events_REALTIME__0__0__20160101T0000Z": { "A": "ONLINE", "B": "ONLINE" },
                "events_REALTIME__0__1__20160101T0600Z": { "A": "CONSUMING", "B": "ERROR" },
                "events_REALTIME__1__0__20160101T0000Z": { "A": "ERROR", "B": "ERROR" }
            },
            "instances": [
                { "instance_id": "A" },
                { "instance_id": "B", "enabled": true }
            ]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(request(Method::GET, "/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_external_view_change_then_debug_tables() {
        let app = app();

        let response = app
            .clone()
            .oneshot(request(
                Method::PUT,
                "/tables/events_REALTIME/external-view",
                Some(external_view_body()),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let summary: RoutingBuildResponse = read_json(response).await;
        assert_eq!(summary.table_name, "events_REALTIME");
        assert_eq!(summary.table_count, 4);
        assert_eq!(summary.routed_segments, 2);
        assert_eq!(
            summary.unassignable_segments,
            vec!["events_REALTIME__1__0__20160101T0000Z".to_string()]
        );

        let response = app
            .oneshot(request(Method::GET, "/debug/routing-tables/events_REALTIME", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let tables: RoutingTablesResponse = read_json(response).await;
        assert_eq!(tables.tables.len(), 4);
        for table in &tables.tables {
            assert!(table["A"].contains(&"events_REALTIME__0__1__20160101T0600Z".to_string()));
        }
    }

    #[tokio::test]
    async fn test_unknown_table_is_not_found() {
        let response = app()
            .oneshot(request(Method::GET, "/debug/routing-tables/missing", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorResponse = read_json(response).await;
        assert!(body.error.contains("missing"));
    }

    #[tokio::test]
    async fn test_drop_table() {
        let app = app();
        app.clone()
            .oneshot(request(
                Method::PUT,
                "/tables/events_REALTIME/external-view",
                Some(external_view_body()),
            ))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/tables/events_REALTIME", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/tables/events_REALTIME", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request(Method::GET, "/debug/routing-tables/events_REALTIME", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_tables() {
        let app = app();
        for table in ["events_REALTIME", "clicks_REALTIME"] {
            let mut segments = serde_json::Map::new();
            segments.insert(
                format!("{table}__0__0__20160101T0000Z"),
                serde_json::json!({ "A": "ONLINE" }),
            );
            let mut body = external_view_body();
            body["segments"] = serde_json::Value::Object(segments);
            let response = app
                .clone()
                .oneshot(request(
                    Method::PUT,
                    &format!("/tables/{table}/external-view"),
                    Some(body),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(request(Method::GET, "/tables", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let list: TableListResponse = read_json(response).await;
        assert_eq!(list.tables, vec!["clicks_REALTIME", "events_REALTIME"]);
    }
}
