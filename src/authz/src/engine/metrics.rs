//! Prometheus-style counters for authorization outcomes

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::decision::{Decision, DenyReason, ReasonCode};

/// Snapshot of decision counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineMetrics {
    /// Total number of checks, including invalid ones
    pub total_checks: u64,

    /// Number of allowed decisions
    pub allowed: u64,

    pub denied_not_granted: u64,
    pub denied_tenant_mismatch: u64,
    pub denied_unit_mismatch: u64,

    pub invalid_role: u64,
    pub invalid_permission: u64,
}

impl EngineMetrics {
    pub fn denied(&self) -> u64 {
        self.denied_not_granted + self.denied_tenant_mismatch + self.denied_unit_mismatch
    }

    pub fn invalid(&self) -> u64 {
        self.invalid_role + self.invalid_permission
    }

    /// Fraction of well-formed checks that were allowed
    pub fn allow_rate(&self) -> f64 {
        let decided = self.allowed + self.denied();
        if decided == 0 {
            0.0
        } else {
            self.allowed as f64 / decided as f64
        }
    }
}

/// Lock-free decision counters, shared across request handlers
#[derive(Debug, Default)]
pub struct MetricsCollector {
    allowed: AtomicU64,
    denied_not_granted: AtomicU64,
    denied_tenant_mismatch: AtomicU64,
    denied_unit_mismatch: AtomicU64,
    invalid_role: AtomicU64,
    invalid_permission: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an authorization decision
    pub fn record_decision(&self, decision: Decision) {
        let counter = match decision {
            Decision::Allow => &self.allowed,
            Decision::Deny(DenyReason::NotGranted) => &self.denied_not_granted,
            Decision::Deny(DenyReason::TenantMismatch) => &self.denied_tenant_mismatch,
            Decision::Deny(DenyReason::UnitMismatch) => &self.denied_unit_mismatch,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected check; codes that are not input errors are ignored
    pub fn record_invalid(&self, code: ReasonCode) {
        match code {
            ReasonCode::InvalidRole => self.invalid_role.fetch_add(1, Ordering::Relaxed),
            ReasonCode::InvalidPermission => {
                self.invalid_permission.fetch_add(1, Ordering::Relaxed)
            }
            _ => return,
        };
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> EngineMetrics {
        let allowed = self.allowed.load(Ordering::Relaxed);
        let denied_not_granted = self.denied_not_granted.load(Ordering::Relaxed);
        let denied_tenant_mismatch = self.denied_tenant_mismatch.load(Ordering::Relaxed);
        let denied_unit_mismatch = self.denied_unit_mismatch.load(Ordering::Relaxed);
        let invalid_role = self.invalid_role.load(Ordering::Relaxed);
        let invalid_permission = self.invalid_permission.load(Ordering::Relaxed);

        EngineMetrics {
            total_checks: allowed
                + denied_not_granted
                + denied_tenant_mismatch
                + denied_unit_mismatch
                + invalid_role
                + invalid_permission,
            allowed,
            denied_not_granted,
            denied_tenant_mismatch,
            denied_unit_mismatch,
            invalid_role,
            invalid_permission,
        }
    }

    /// Export metrics in Prometheus format
    pub fn export_prometheus(&self) -> String {
        let m = self.snapshot();

        format!(
            r#"# HELP authz_checks_total Total number of authorization checks
# TYPE authz_checks_total counter
authz_checks_total {}

# HELP authz_allowed_total Number of allowed decisions
# TYPE authz_allowed_total counter
authz_allowed_total {}

# HELP authz_denied_total Number of denied decisions by reason
# TYPE authz_denied_total counter
authz_denied_total{{reason="{}"}} {}
authz_denied_total{{reason="{}"}} {}
authz_denied_total{{reason="{}"}} {}

# HELP authz_invalid_total Checks rejected for malformed input
# TYPE authz_invalid_total counter
authz_invalid_total{{kind="{}"}} {}
authz_invalid_total{{kind="{}"}} {}
"#,
            m.total_checks,
            m.allowed,
            ReasonCode::NotGranted,
            m.denied_not_granted,
            ReasonCode::TenantMismatch,
            m.denied_tenant_mismatch,
            ReasonCode::UnitMismatch,
            m.denied_unit_mismatch,
            ReasonCode::InvalidRole,
            m.invalid_role,
            ReasonCode::InvalidPermission,
            m.invalid_permission,
        )
    }
}
