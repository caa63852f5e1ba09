//! Core authorization types: roles and permissions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AuthzError;

/// Identity class of a principal
///
/// Exactly one role is presented per authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform operator: tenant lifecycle and plan approval
    SuperAdmin,
    /// Owner of a tenant account
    TenantOwner,
    /// Administrator within a tenant
    TenantAdmin,
    /// Day-to-day building operations staff
    Operator,
    /// Resident bound to a unit
    Resident,
}

impl Role {
    /// Every role, in declaration order
    pub const ALL: [Role; 5] = [
        Role::SuperAdmin,
        Role::TenantOwner,
        Role::TenantAdmin,
        Role::Operator,
        Role::Resident,
    ];

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::TenantOwner => "TENANT_OWNER",
            Role::TenantAdmin => "TENANT_ADMIN",
            Role::Operator => "OPERATOR",
            Role::Resident => "RESIDENT",
        }
    }

    /// Whether this role may act outside its own tenant
    pub fn bypasses_tenant_binding(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AuthzError::InvalidRole(s.to_string()))
    }
}

/// Atomic capability, namespaced `resource.action`
///
/// Permissions carry no hierarchy: `tickets.manage` does not imply
/// `tickets.create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    TenantsManage,
    PlansRead,
    PlansApprove,
    SettingsManage,
    UsersRead,
    UsersManage,
    PropertiesRead,
    PropertiesWrite,
    UnitsRead,
    UnitsWrite,
    TicketsRead,
    TicketsCreate,
    TicketsManage,
    VendorsRead,
    VendorsManage,
    QuotesRead,
    QuotesRequest,
    QuotesApprove,
    WorkOrdersRead,
    WorkOrdersManage,
    CommunicationsRead,
    CommunicationsSend,
    ExpensesRead,
    ExpensesWrite,
    PaymentsRead,
    PaymentsSubmit,
}

impl Permission {
    /// Every permission, in declaration order
    pub const ALL: [Permission; 26] = [
        Permission::TenantsManage,
        Permission::PlansRead,
        Permission::PlansApprove,
        Permission::SettingsManage,
        Permission::UsersRead,
        Permission::UsersManage,
        Permission::PropertiesRead,
        Permission::PropertiesWrite,
        Permission::UnitsRead,
        Permission::UnitsWrite,
        Permission::TicketsRead,
        Permission::TicketsCreate,
        Permission::TicketsManage,
        Permission::VendorsRead,
        Permission::VendorsManage,
        Permission::QuotesRead,
        Permission::QuotesRequest,
        Permission::QuotesApprove,
        Permission::WorkOrdersRead,
        Permission::WorkOrdersManage,
        Permission::CommunicationsRead,
        Permission::CommunicationsSend,
        Permission::ExpensesRead,
        Permission::ExpensesWrite,
        Permission::PaymentsRead,
        Permission::PaymentsSubmit,
    ];

    /// Wire representation (`resource.action`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::TenantsManage => "tenants.manage",
            Permission::PlansRead => "plans.read",
            Permission::PlansApprove => "plans.approve",
            Permission::SettingsManage => "settings.manage",
            Permission::UsersRead => "users.read",
            Permission::UsersManage => "users.manage",
            Permission::PropertiesRead => "properties.read",
            Permission::PropertiesWrite => "properties.write",
            Permission::UnitsRead => "units.read",
            Permission::UnitsWrite => "units.write",
            Permission::TicketsRead => "tickets.read",
            Permission::TicketsCreate => "tickets.create",
            Permission::TicketsManage => "tickets.manage",
            Permission::VendorsRead => "vendors.read",
            Permission::VendorsManage => "vendors.manage",
            Permission::QuotesRead => "quotes.read",
            Permission::QuotesRequest => "quotes.request",
            Permission::QuotesApprove => "quotes.approve",
            Permission::WorkOrdersRead => "work_orders.read",
            Permission::WorkOrdersManage => "work_orders.manage",
            Permission::CommunicationsRead => "communications.read",
            Permission::CommunicationsSend => "communications.send",
            Permission::ExpensesRead => "expenses.read",
            Permission::ExpensesWrite => "expenses.write",
            Permission::PaymentsRead => "payments.read",
            Permission::PaymentsSubmit => "payments.submit",
        }
    }

    /// Resource namespace, e.g. `tickets`
    pub fn resource(&self) -> &'static str {
        self.split().0
    }

    /// Action within the namespace, e.g. `create`
    pub fn action(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let s = self.as_str();
        // Every wire string contains exactly one dot.
        match s.split_once('.') {
            Some(parts) => parts,
            None => (s, ""),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| AuthzError::InvalidPermission(s.to_string()))
    }
}

impl Serialize for Permission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
