use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use estatedesk_authz::{AuthzError, ReasonCode};
use serde_json::json;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Failures surfaced by the API
///
/// A denied authorization is not an error; it is a normal 403 response from
/// the handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unknown role or permission: a caller bug
    #[error("{message}")]
    InvalidInput { code: ReasonCode, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err.reason_code() {
            Some(code) => ApiError::InvalidInput {
                code,
                message: err.to_string(),
            },
            None => match err {
                AuthzError::InvalidScope(msg) => ApiError::ValidationError(msg),
                other => ApiError::InternalError(other.to_string()),
            },
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let reason = match &self {
            ApiError::InvalidInput { code, .. } => Some(code.as_str()),
            _ => None,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "reason": reason,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
