use estatedesk_authz::engine::audit::DEFAULT_AUDIT_CAPACITY;
use estatedesk_authz::{AuditLog, AuthzEngine, MetricsCollector};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Authorization engine over the boot-time grant table
    pub engine: AuthzEngine,

    /// Recent authorization checks
    pub audit: Arc<AuditLog>,

    /// Decision counters
    pub metrics: Arc<MetricsCollector>,

    /// Server start time for uptime calculation
    pub start_time: Instant,

    /// Application version
    pub version: String,
}

impl AppState {
    pub fn new(engine: AuthzEngine, audit_capacity: usize) -> Self {
        Self {
            engine,
            audit: Arc::new(AuditLog::new(audit_capacity)),
            metrics: Arc::new(MetricsCollector::new()),
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AuthzEngine::builtin(), DEFAULT_AUDIT_CAPACITY)
    }
}
