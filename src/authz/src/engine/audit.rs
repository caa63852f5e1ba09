//! Audit logging for authorization decisions
//!
//! Bounded in-memory trail of recent checks:
//! - Decision metadata (role, permission, scopes, outcome)
//! - Searchable by tenant, outcome, recency
//!
//! The engine itself never writes here; request handlers record each check
//! after deciding it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::decision::{AuthRequest, Decision, DenyReason, ReasonCode};
use crate::scope::Scope;

/// Default number of entries kept
pub const DEFAULT_AUDIT_CAPACITY: usize = 10_000;

/// Result of an audited check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "lowercase")]
pub enum AuditOutcome {
    Allow,
    Deny(DenyReason),
    /// Caller supplied an unknown role or permission
    Invalid(ReasonCode),
}

impl From<Decision> for AuditOutcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => AuditOutcome::Allow,
            Decision::Deny(reason) => AuditOutcome::Deny(reason),
        }
    }
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique entry ID
    pub id: String,

    /// Role string as presented (may be invalid)
    pub role: String,

    /// Permission string as presented (may be invalid)
    pub permission: String,

    /// Tenant the action targeted
    pub requested_tenant_id: String,

    /// Unit the action targeted, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_unit_id: Option<String>,

    /// Tenant the principal is bound to
    pub principal_tenant_id: String,

    /// Unit the principal is bound to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_unit_id: Option<String>,

    pub outcome: AuditOutcome,

    pub timestamp: DateTime<Utc>,
}

/// Tenant and unit identifiers as presented by the caller
///
/// Lets a check be audited even when its scopes never validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeIds<'a> {
    pub tenant_id: &'a str,
    pub unit_id: Option<&'a str>,
}

impl<'a> From<&'a Scope> for ScopeIds<'a> {
    fn from(scope: &'a Scope) -> Self {
        Self {
            tenant_id: scope.tenant_id(),
            unit_id: scope.unit_id(),
        }
    }
}

impl AuditEntry {
    /// Build an entry for a request and its outcome
    pub fn new(request: &AuthRequest, outcome: AuditOutcome) -> Self {
        Self::from_parts(
            &request.role,
            &request.permission,
            (&request.requested_scope).into(),
            (&request.principal_scope).into(),
            outcome,
        )
    }

    /// Build an entry from raw request fields
    pub fn from_parts(
        role: &str,
        permission: &str,
        requested: ScopeIds<'_>,
        principal: ScopeIds<'_>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: role.to_string(),
            permission: permission.to_string(),
            requested_tenant_id: requested.tenant_id.to_string(),
            requested_unit_id: requested.unit_id.map(str::to_string),
            principal_tenant_id: principal.tenant_id.to_string(),
            principal_unit_id: principal.unit_id.map(str::to_string),
            outcome,
            timestamp: Utc::now(),
        }
    }

    pub fn is_denial(&self) -> bool {
        matches!(self.outcome, AuditOutcome::Deny(_))
    }
}

/// Audit statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    pub total: usize,
    pub allowed: usize,
    pub denied: usize,
    pub invalid: usize,
}

/// Bounded audit trail; oldest entries are evicted first
pub struct AuditLog {
    buffer: RwLock<VecDeque<AuditEntry>>,
    capacity: usize,
}

impl AuditLog {
    /// Create an audit log keeping at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_AUDIT_CAPACITY))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry
    pub async fn record(&self, entry: AuditEntry) {
        let mut buffer = self.buffer.write().await;
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry);
    }

    /// Most recent entries matching the filters, newest first
    ///
    /// Only the returned entries are cloned.
    pub async fn query(
        &self,
        tenant_id: Option<&str>,
        denials_only: bool,
        limit: usize,
    ) -> Vec<AuditEntry> {
        let buffer = self.buffer.read().await;
        buffer
            .iter()
            .rev()
            .filter(|e| tenant_id.map_or(true, |t| e.requested_tenant_id == t))
            .filter(|e| !denials_only || e.is_denial())
            .take(limit)
            .cloned()
            .collect()
    }

    /// Most recent entries, newest first
    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.query(None, false, limit).await
    }

    /// Most recent entries whose requested tenant is `tenant_id`, newest first
    pub async fn query_by_tenant(&self, tenant_id: &str, limit: usize) -> Vec<AuditEntry> {
        self.query(Some(tenant_id), false, limit).await
    }

    /// Most recent denials, newest first
    pub async fn denials(&self, limit: usize) -> Vec<AuditEntry> {
        self.query(None, true, limit).await
    }

    pub async fn len(&self) -> usize {
        self.buffer.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.buffer.read().await.is_empty()
    }

    /// Get audit statistics over the retained entries
    pub async fn stats(&self) -> AuditStats {
        let buffer = self.buffer.read().await;
        let mut stats = AuditStats {
            total: buffer.len(),
            ..Default::default()
        };
        for entry in buffer.iter() {
            match entry.outcome {
                AuditOutcome::Allow => stats.allowed += 1,
                AuditOutcome::Deny(_) => stats.denied += 1,
                AuditOutcome::Invalid(_) => stats.invalid += 1,
            }
        }
        stats
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CAPACITY)
    }
}
