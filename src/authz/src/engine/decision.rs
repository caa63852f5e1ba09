//! Authorization decision types and request handling

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scope::Scope;

/// Authorization request as it arrives from a caller
///
/// Role and permission stay as raw strings so that unknown values surface as
/// `InvalidRole` / `InvalidPermission` instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    /// Principal's role, e.g. `"RESIDENT"`
    pub role: String,

    /// Requested permission, e.g. `"tickets.create"`
    pub permission: String,

    /// Boundary the action targets
    pub requested_scope: Scope,

    /// Boundary the principal is bound to
    pub principal_scope: Scope,
}

/// Outcome of one authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("ALLOW"),
            Decision::Deny(reason) => write!(f, "DENY({})", reason.code()),
        }
    }
}

/// Why a well-formed request was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// Role does not hold the permission
    NotGranted,
    /// Target tenant differs from the principal's tenant
    TenantMismatch,
    /// Target unit differs from the principal's unit
    UnitMismatch,
}

impl DenyReason {
    pub const ALL: [DenyReason; 3] = [
        DenyReason::NotGranted,
        DenyReason::TenantMismatch,
        DenyReason::UnitMismatch,
    ];

    pub fn code(&self) -> ReasonCode {
        match self {
            DenyReason::NotGranted => ReasonCode::NotGranted,
            DenyReason::TenantMismatch => ReasonCode::TenantMismatch,
            DenyReason::UnitMismatch => ReasonCode::UnitMismatch,
        }
    }
}

/// Closed taxonomy covering denials and input-validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    NotGranted,
    TenantMismatch,
    UnitMismatch,
    InvalidRole,
    InvalidPermission,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::NotGranted => "NOT_GRANTED",
            ReasonCode::TenantMismatch => "TENANT_MISMATCH",
            ReasonCode::UnitMismatch => "UNIT_MISMATCH",
            ReasonCode::InvalidRole => "INVALID_ROLE",
            ReasonCode::InvalidPermission => "INVALID_PERMISSION",
        }
    }

    /// Whether the code reports a caller bug rather than a denial
    pub fn is_input_error(&self) -> bool {
        matches!(self, ReasonCode::InvalidRole | ReasonCode::InvalidPermission)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
