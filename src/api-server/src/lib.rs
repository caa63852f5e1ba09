//! REST API for the EstateDesk authorization engine
//!
//! Exposes authorization checks, role/permission listings for UI control
//! visibility, the in-memory audit log and Prometheus metrics.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, Result};
pub use server::Server;
pub use state::AppState;

/// API version
pub const API_VERSION: &str = "v1";

/// Health check response
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}
