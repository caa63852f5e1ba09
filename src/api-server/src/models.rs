use estatedesk_authz::engine::ScopeIds;
use estatedesk_authz::{
    AuditEntry, AuditOutcome, AuthRequest, AuthzError, Decision, Permission, Role, Scope,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Tenant / property / unit boundary
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ScopeBody {
    /// Tenant identifier (required)
    #[validate(length(min = 1, max = 255))]
    pub tenant_id: String,

    /// Property identifier
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub property_id: Option<String>,

    /// Unit identifier
    #[serde(default)]
    #[validate(length(min = 1, max = 255))]
    pub unit_id: Option<String>,
}

impl ScopeBody {
    /// Identifiers as sent, for auditing
    pub fn ids(&self) -> ScopeIds<'_> {
        ScopeIds {
            tenant_id: &self.tenant_id,
            unit_id: self.unit_id.as_deref(),
        }
    }
}

impl TryFrom<ScopeBody> for Scope {
    type Error = AuthzError;

    fn try_from(body: ScopeBody) -> Result<Self, Self::Error> {
        Scope::from_parts(body.tenant_id, body.property_id, body.unit_id)
    }
}

/// Authorization check request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuthorizeRequest {
    /// Principal's role, e.g. `RESIDENT`; checked by the engine
    pub role: String,

    /// Requested permission, e.g. `tickets.create`; checked by the engine
    pub permission: String,

    /// Boundary the action targets
    #[validate(nested)]
    pub requested_scope: ScopeBody,

    /// Boundary the principal is bound to
    #[validate(nested)]
    pub principal_scope: ScopeBody,
}

impl AuthorizeRequest {
    /// Audit entry for this request as received
    pub fn audit_entry(&self, outcome: AuditOutcome) -> AuditEntry {
        AuditEntry::from_parts(
            &self.role,
            &self.permission,
            self.requested_scope.ids(),
            self.principal_scope.ids(),
            outcome,
        )
    }
}

impl TryFrom<AuthorizeRequest> for AuthRequest {
    type Error = AuthzError;

    fn try_from(req: AuthorizeRequest) -> Result<Self, Self::Error> {
        Ok(AuthRequest {
            role: req.role,
            permission: req.permission,
            requested_scope: req.requested_scope.try_into()?,
            principal_scope: req.principal_scope.try_into()?,
        })
    }
}

/// Authorization check response (200 on allow, 403 on deny)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeResponse {
    /// `allow` or `deny`
    pub decision: String,

    /// Denial reason code, e.g. `UNIT_MISMATCH`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Decision> for AuthorizeResponse {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow => Self {
                decision: "allow".to_string(),
                reason: None,
            },
            Decision::Deny(reason) => Self {
                decision: "deny".to_string(),
                reason: Some(reason.code().to_string()),
            },
        }
    }
}

/// Permissions held by one role
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RolePermissionsResponse {
    pub role: String,
    pub permissions: Vec<String>,
}

impl RolePermissionsResponse {
    pub fn new<'a>(role: Role, permissions: impl IntoIterator<Item = &'a Permission>) -> Self {
        Self {
            role: role.to_string(),
            permissions: permissions.into_iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// All roles and their permissions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListRolesResponse {
    pub roles: Vec<RolePermissionsResponse>,
}

/// Audit log query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    /// Maximum number of entries (default 100)
    pub limit: Option<usize>,

    /// Only entries targeting this tenant
    pub tenant_id: Option<String>,

    /// Only denied checks
    #[serde(default)]
    pub denials_only: bool,
}

/// One audited check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditEntryResponse {
    pub id: String,
    pub role: String,
    pub permission: String,
    pub requested_tenant_id: String,
    pub requested_unit_id: Option<String>,
    pub principal_tenant_id: String,
    pub principal_unit_id: Option<String>,
    /// `allow`, `deny` or `invalid`
    pub outcome: String,
    pub reason: Option<String>,
    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(entry: AuditEntry) -> Self {
        let (outcome, reason) = match entry.outcome {
            AuditOutcome::Allow => ("allow", None),
            AuditOutcome::Deny(reason) => ("deny", Some(reason.code().to_string())),
            AuditOutcome::Invalid(code) => ("invalid", Some(code.to_string())),
        };

        Self {
            id: entry.id,
            role: entry.role,
            permission: entry.permission,
            requested_tenant_id: entry.requested_tenant_id,
            requested_unit_id: entry.requested_unit_id,
            principal_tenant_id: entry.principal_tenant_id,
            principal_unit_id: entry.principal_unit_id,
            outcome: outcome.to_string(),
            reason,
            timestamp: entry.timestamp.to_rfc3339(),
        }
    }
}

/// Audit log query response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponse {
    pub entries: Vec<AuditEntryResponse>,
    pub total: usize,
}
