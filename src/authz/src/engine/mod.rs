//! Authorization engine
//!
//! Decides whether a principal holding a role, bound to a scope, may exercise
//! a permission against a requested scope. The decision is a pure function of
//! its inputs and the grant table; audit and metrics are recorded by callers
//! through [`AuditLog`] and [`MetricsCollector`].

pub mod decision;
pub mod audit;
pub mod metrics;

pub use decision::{AuthRequest, Decision, DenyReason, ReasonCode};
pub use audit::{AuditEntry, AuditLog, AuditOutcome, AuditStats, ScopeIds};
pub use metrics::{EngineMetrics, MetricsCollector};

use crate::error::Result;
use crate::grants::GrantTable;
use crate::scope::Scope;
use crate::types::{Permission, Role};

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::trace;

/// Stateless authorization engine over an immutable grant table
///
/// # Pipeline
///
/// ```text
/// (role, permission) ─→ grant lookup ─→ tenant binding ─→ unit narrowing ─→ Decision
///                          │                 │                  │
///                      NotGranted      TenantMismatch      UnitMismatch
/// ```
///
/// Cloning is cheap; clones share the same table.
#[derive(Debug, Clone)]
pub struct AuthzEngine {
    grants: Arc<GrantTable>,
}

impl AuthzEngine {
    /// Create an engine over the given grant table
    pub fn new(grants: GrantTable) -> Self {
        Self {
            grants: Arc::new(grants),
        }
    }

    /// Create an engine over the shipped grant table
    pub fn builtin() -> Self {
        Self::new(GrantTable::builtin())
    }

    /// The grant table this engine consults
    pub fn grant_table(&self) -> &GrantTable {
        &self.grants
    }

    /// Decide a typed request
    ///
    /// # Algorithm
    ///
    /// 1. `permission` must be in the role's grant set, else `NotGranted`.
    /// 2. Unless the role bypasses tenant binding, the tenants must match,
    ///    else `TenantMismatch`.
    /// 3. When both scopes name a unit they must match unless the permission
    ///    is unit-agnostic, else `UnitMismatch`.
    pub fn authorize(
        &self,
        role: Role,
        permission: Permission,
        requested_scope: &Scope,
        principal_scope: &Scope,
    ) -> Decision {
        let decision = self.evaluate(role, permission, requested_scope, principal_scope);

        trace!(
            role = %role,
            permission = %permission,
            requested = %requested_scope,
            principal = %principal_scope,
            decision = %decision,
            "authorization evaluated"
        );

        decision
    }

    fn evaluate(
        &self,
        role: Role,
        permission: Permission,
        requested_scope: &Scope,
        principal_scope: &Scope,
    ) -> Decision {
        if !self.grants.grants(role, permission) {
            return Decision::Deny(DenyReason::NotGranted);
        }

        if !role.bypasses_tenant_binding()
            && requested_scope.tenant_id() != principal_scope.tenant_id()
        {
            return Decision::Deny(DenyReason::TenantMismatch);
        }

        if let (Some(bound), Some(target)) = (principal_scope.unit_id(), requested_scope.unit_id()) {
            if bound != target && !self.grants.is_unit_agnostic(permission) {
                return Decision::Deny(DenyReason::UnitMismatch);
            }
        }

        Decision::Allow
    }

    /// Decide a request given as raw role and permission strings
    ///
    /// Unknown strings fail with `InvalidRole` / `InvalidPermission`; they are
    /// never reported as a denial. The role is validated first.
    pub fn check(
        &self,
        role: &str,
        permission: &str,
        requested_scope: &Scope,
        principal_scope: &Scope,
    ) -> Result<Decision> {
        let (role, permission) = Self::parse_inputs(role, permission)?;
        Ok(self.authorize(role, permission, requested_scope, principal_scope))
    }

    /// Parse raw role and permission strings, role first
    pub fn parse_inputs(role: &str, permission: &str) -> Result<(Role, Permission)> {
        Ok((role.parse()?, permission.parse()?))
    }

    /// Decide a deserialized [`AuthRequest`]
    pub fn check_request(&self, request: &AuthRequest) -> Result<Decision> {
        self.check(
            &request.role,
            &request.permission,
            &request.requested_scope,
            &request.principal_scope,
        )
    }

    /// Every permission `role` holds, for menu and control visibility
    ///
    /// This is the same set [`authorize`](Self::authorize) consults.
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        self.grants.permissions_for(role)
    }
}

impl Default for AuthzEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthzError;

    fn tenant(id: &str) -> Scope {
        Scope::tenant(id).unwrap()
    }

    fn unit(tenant_id: &str, unit_id: &str) -> Scope {
        Scope::tenant(tenant_id).unwrap().with_unit(unit_id).unwrap()
    }

    #[test]
    fn test_engine_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AuthzEngine>();
    }

    #[test]
    fn test_allow_within_tenant() {
        let engine = AuthzEngine::builtin();
        let decision = engine.authorize(
            Role::TenantAdmin,
            Permission::PropertiesWrite,
            &tenant("T1"),
            &tenant("T1"),
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_not_granted_checked_before_tenant() {
        let engine = AuthzEngine::builtin();
        let decision = engine.authorize(
            Role::Operator,
            Permission::PaymentsSubmit,
            &tenant("T2"),
            &tenant("T1"),
        );
        assert_eq!(decision, Decision::Deny(DenyReason::NotGranted));
    }

    #[test]
    fn test_tenant_checked_before_unit() {
        let engine = AuthzEngine::builtin();
        let decision = engine.authorize(
            Role::Resident,
            Permission::TicketsCreate,
            &unit("T2", "U2"),
            &unit("T1", "U1"),
        );
        assert_eq!(decision, Decision::Deny(DenyReason::TenantMismatch));
    }

    #[test]
    fn test_unit_bound_principal_tenant_wide_request() {
        // Only a named target unit is narrowed.
        let engine = AuthzEngine::builtin();
        let decision = engine.authorize(
            Role::Resident,
            Permission::TicketsRead,
            &tenant("T1"),
            &unit("T1", "U1"),
        );
        assert_eq!(decision, Decision::Allow);
    }

    #[test]
    fn test_super_admin_still_unit_narrowed() {
        let engine = AuthzEngine::builtin();
        let decision = engine.authorize(
            Role::SuperAdmin,
            Permission::UnitsWrite,
            &unit("T2", "U2"),
            &unit("T1", "U1"),
        );
        assert_eq!(decision, Decision::Deny(DenyReason::UnitMismatch));
    }

    #[test]
    fn test_check_validates_role_first() {
        let engine = AuthzEngine::builtin();
        let err = engine
            .check("GUEST", "nope.nope", &tenant("T1"), &tenant("T1"))
            .unwrap_err();
        assert!(matches!(err, AuthzError::InvalidRole(_)));
        assert_eq!(err.reason_code(), Some(ReasonCode::InvalidRole));
    }

    #[test]
    fn test_parse_inputs() {
        assert_eq!(
            AuthzEngine::parse_inputs("OPERATOR", "work_orders.manage").unwrap(),
            (Role::Operator, Permission::WorkOrdersManage)
        );
        assert!(matches!(
            AuthzEngine::parse_inputs("", "tickets.read"),
            Err(AuthzError::InvalidRole(_))
        ));
        assert!(matches!(
            AuthzEngine::parse_inputs(&"R".repeat(65), ""),
            Err(AuthzError::InvalidRole(_))
        ));
        assert!(matches!(
            AuthzEngine::parse_inputs("RESIDENT", ""),
            Err(AuthzError::InvalidPermission(_))
        ));
    }

    #[test]
    fn test_check_invalid_permission() {
        let engine = AuthzEngine::builtin();
        let err = engine
            .check("OPERATOR", "tickets.delete", &tenant("T1"), &tenant("T1"))
            .unwrap_err();
        assert!(matches!(err, AuthzError::InvalidPermission(ref p) if p == "tickets.delete"));
    }

    #[test]
    fn test_custom_grant_table() {
        let json = r#"{
            "grants": {
                "SUPER_ADMIN": ["tenants.manage"],
                "TENANT_OWNER": ["tenants.manage"],
                "TENANT_ADMIN": ["tenants.manage"],
                "OPERATOR": ["tenants.manage"],
                "RESIDENT": ["tickets.create"]
            },
            "unit_agnostic": ["tickets.create"]
        }"#;
        let engine = AuthzEngine::new(GrantTable::from_json(json).unwrap());

        assert_eq!(
            engine.authorize(Role::Resident, Permission::TicketsCreate, &unit("T1", "U2"), &unit("T1", "U1")),
            Decision::Allow
        );
        assert_eq!(
            engine.authorize(Role::Resident, Permission::TicketsRead, &tenant("T1"), &tenant("T1")),
            Decision::Deny(DenyReason::NotGranted)
        );
    }

    #[test]
    fn test_clones_share_table() {
        let engine = AuthzEngine::builtin();
        let clone = engine.clone();
        assert!(std::ptr::eq(engine.grant_table(), clone.grant_table()));
    }
}
