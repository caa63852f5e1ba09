use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use estatedesk_authz::{AuditEntry, AuditOutcome, AuthRequest, AuthzEngine, Decision, Role};
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use crate::{
    error::{ApiError, Result},
    models::*,
    state::AppState,
    HealthResponse,
};

/// Entries returned by the audit endpoint when no limit is given
const DEFAULT_AUDIT_LIMIT: usize = 100;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// Prometheus metrics endpoint
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Prometheus text exposition", body = String, content_type = "text/plain")
    ),
    tag = "health"
)]
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = format!(
        "{}\n# HELP authz_uptime_seconds Server uptime in seconds\n\
         # TYPE authz_uptime_seconds gauge\n\
         authz_uptime_seconds {}\n",
        state.metrics.export_prometheus(),
        state.uptime_seconds(),
    );

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

/// Authorization check endpoint
///
/// Allow → 200, Deny → 403 with a reason code, unknown role or permission →
/// 400 with a reason code. Role and permission are checked before the scopes,
/// so every such rejection is audited and counted. Malformed scopes are
/// rejected with 400 before any decision is made.
#[utoipa::path(
    post,
    path = "/api/v1/authorize",
    request_body = AuthorizeRequest,
    responses(
        (status = 200, description = "Allowed", body = AuthorizeResponse),
        (status = 403, description = "Denied", body = AuthorizeResponse),
        (status = 400, description = "Invalid role, permission or scope")
    ),
    tag = "authorization"
)]
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthorizeResponse>)> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let (role, permission) = match AuthzEngine::parse_inputs(&req.role, &req.permission) {
        Ok(parsed) => parsed,
        Err(err) => {
            if let Some(code) = err.reason_code() {
                state.metrics.record_invalid(code);
                state
                    .audit
                    .record(req.audit_entry(AuditOutcome::Invalid(code)))
                    .await;
            }
            error!(
                role = %req.role,
                permission = %req.permission,
                "Rejected authorization check: {}",
                err
            );
            return Err(err.into());
        }
    };

    req.validate()?;
    let request: AuthRequest = req.try_into()?;

    let decision = state.engine.authorize(
        role,
        permission,
        &request.requested_scope,
        &request.principal_scope,
    );
    state.metrics.record_decision(decision);
    state
        .audit
        .record(AuditEntry::new(&request, decision.into()))
        .await;

    let status = match decision {
        Decision::Allow => {
            info!(
                role = %role,
                permission = %permission,
                tenant = %request.requested_scope.tenant_id(),
                "Authorization allowed"
            );
            StatusCode::OK
        }
        Decision::Deny(reason) => {
            warn!(
                role = %role,
                permission = %permission,
                requested = %request.requested_scope,
                principal = %request.principal_scope,
                reason = %reason.code(),
                "Authorization denied"
            );
            StatusCode::FORBIDDEN
        }
    };

    Ok((status, Json(decision.into())))
}

/// List every role with its permissions
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    responses(
        (status = 200, description = "Roles and their permissions", body = ListRolesResponse)
    ),
    tag = "roles"
)]
pub async fn list_roles(State(state): State<Arc<AppState>>) -> Json<ListRolesResponse> {
    let roles = Role::ALL
        .into_iter()
        .map(|role| RolePermissionsResponse::new(role, state.engine.permissions_for(role)))
        .collect();

    Json(ListRolesResponse { roles })
}

/// Permissions held by one role, for control visibility
#[utoipa::path(
    get,
    path = "/api/v1/roles/{role}/permissions",
    params(
        ("role" = String, Path, description = "Role name, e.g. RESIDENT")
    ),
    responses(
        (status = 200, description = "Permissions of the role", body = RolePermissionsResponse),
        (status = 400, description = "Unknown role")
    ),
    tag = "roles"
)]
pub async fn role_permissions(
    State(state): State<Arc<AppState>>,
    Path(role): Path<String>,
) -> Result<Json<RolePermissionsResponse>> {
    let role: Role = role.parse()?;
    Ok(Json(RolePermissionsResponse::new(
        role,
        state.engine.permissions_for(role),
    )))
}

/// Recent audited checks, newest first
#[utoipa::path(
    get,
    path = "/api/v1/audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit entries", body = AuditLogResponse)
    ),
    tag = "audit"
)]
pub async fn audit_log(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditQuery>,
) -> Json<AuditLogResponse> {
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);

    let entries = state
        .audit
        .query(query.tenant_id.as_deref(), query.denials_only, limit)
        .await;

    Json(AuditLogResponse {
        total: state.audit.len().await,
        entries: entries.into_iter().map(Into::into).collect(),
    })
}
