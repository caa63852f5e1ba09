//! Route definitions for the API server
//!
//! - Health and metrics endpoints
//! - Authorization checks
//! - Role/permission listings
//! - Audit log

use crate::{handlers, middleware, state::AppState, API_VERSION};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EstateDesk Authorization API",
        version = "1.0.0",
        description = "Role-based authorization checks for the property management platform",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    paths(
        handlers::health_check,
        handlers::metrics,
        handlers::authorize,
        handlers::list_roles,
        handlers::role_permissions,
        handlers::audit_log,
    ),
    components(
        schemas(
            crate::HealthResponse,
            crate::models::ScopeBody,
            crate::models::AuthorizeRequest,
            crate::models::AuthorizeResponse,
            crate::models::RolePermissionsResponse,
            crate::models::ListRolesResponse,
            crate::models::AuditEntryResponse,
            crate::models::AuditLogResponse,
        )
    ),
    tags(
        (name = "health", description = "Health and monitoring endpoints"),
        (name = "authorization", description = "Authorization check endpoints"),
        (name = "roles", description = "Role and permission listings"),
        (name = "audit", description = "Recent authorization decisions"),
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    )
)]
pub struct ApiDoc;

/// Create the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/authorize", post(handlers::authorize))
        .route("/roles", get(handlers::list_roles))
        .route("/roles/:role/permissions", get(handlers::role_permissions))
        .route("/audit", get(handlers::audit_log));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest(&format!("/api/{}", API_VERSION), api_routes)
        .with_state(state)
        // Executed bottom to top
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::cors_layer())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn create_test_state() -> Arc<AppState> {
        Arc::new(AppState::default())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(middleware::X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_openapi_json() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_mounted_under_version() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/{}/roles", API_VERSION))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_openapi_lists_authorize_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/authorize"));
        assert!(doc.paths.paths.contains_key("/api/v1/roles/{role}/permissions"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_router(create_test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/policies")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
