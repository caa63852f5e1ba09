//! Role to permission grant table
//!
//! The table is built once (from the shipped defaults or a JSON document at
//! boot) and never mutated afterwards. Every role has a non-empty grant set.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{AuthzError, Result};
use crate::types::{Permission, Role};

/// Permissions that pass the unit-narrowing check by default
const DEFAULT_UNIT_AGNOSTIC: &[Permission] = &[Permission::CommunicationsRead];

/// Immutable Role → Permission-set mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantTable {
    grants: BTreeMap<Role, BTreeSet<Permission>>,
    unit_agnostic: BTreeSet<Permission>,
}

/// On-disk form of a grant table override
///
/// ```json
/// {
///   "grants": { "RESIDENT": ["tickets.create", "tickets.read"], ... },
///   "unit_agnostic": ["communications.read"]
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GrantDocument {
    #[serde(deserialize_with = "deserialize_role_entries")]
    grants: Vec<(String, Vec<String>)>,
    #[serde(default)]
    unit_agnostic: Option<Vec<String>>,
}

/// Keeps every `role: [permissions]` entry in document order, so repeated
/// role keys reach validation instead of silently overwriting each other.
fn deserialize_role_entries<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<(String, Vec<String>)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RoleEntriesVisitor;

    impl<'de> Visitor<'de> for RoleEntriesVisitor {
        type Value = Vec<(String, Vec<String>)>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a map of role names to permission lists")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Vec<String>>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(RoleEntriesVisitor)
}

impl GrantTable {
    /// Builds a table, checking that every role has at least one permission
    pub fn new(
        grants: BTreeMap<Role, BTreeSet<Permission>>,
        unit_agnostic: BTreeSet<Permission>,
    ) -> Result<Self> {
        for role in Role::ALL {
            match grants.get(&role) {
                None => {
                    return Err(AuthzError::InvalidGrantTable(format!(
                        "role {} has no entry",
                        role
                    )))
                }
                Some(set) if set.is_empty() => {
                    return Err(AuthzError::InvalidGrantTable(format!(
                        "role {} has an empty permission set",
                        role
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            grants,
            unit_agnostic,
        })
    }

    /// The shipped grant table
    pub fn builtin() -> Self {
        use Permission::*;

        let all: BTreeSet<Permission> = Permission::ALL.into_iter().collect();

        let owner: BTreeSet<Permission> = all
            .iter()
            .copied()
            .filter(|p| !matches!(p, TenantsManage | PlansApprove))
            .collect();

        let admin = BTreeSet::from([
            PlansRead,
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
        ]);

        let operator = BTreeSet::from([
            PropertiesRead,
            UnitsRead,
            TicketsRead,
            TicketsCreate,
            TicketsManage,
            VendorsRead,
            QuotesRead,
            QuotesRequest,
            WorkOrdersRead,
            WorkOrdersManage,
            CommunicationsRead,
            CommunicationsSend,
            ExpensesRead,
        ]);

        let resident = BTreeSet::from([
            UnitsRead,
            TicketsRead,
            TicketsCreate,
            CommunicationsRead,
            PaymentsRead,
            PaymentsSubmit,
        ]);

        Self {
            grants: BTreeMap::from([
                (Role::SuperAdmin, all),
                (Role::TenantOwner, owner),
                (Role::TenantAdmin, admin),
                (Role::Operator, operator),
                (Role::Resident, resident),
            ]),
            unit_agnostic: DEFAULT_UNIT_AGNOSTIC.iter().copied().collect(),
        }
    }

    /// Parses a grant table document
    ///
    /// Unknown role keys fail with `InvalidRole`, unknown permission strings
    /// with `InvalidPermission`. When `unit_agnostic` is omitted the default
    /// set is used.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: GrantDocument = serde_json::from_str(json)
            .map_err(|e| AuthzError::InvalidGrantTable(e.to_string()))?;

        let mut grants = BTreeMap::new();
        for (raw_role, raw_permissions) in doc.grants {
            let role: Role = raw_role.parse()?;
            let permissions = raw_permissions
                .iter()
                .map(|p| p.parse::<Permission>())
                .collect::<Result<BTreeSet<_>>>()?;
            if grants.insert(role, permissions).is_some() {
                return Err(AuthzError::InvalidGrantTable(format!(
                    "role {} is listed more than once",
                    role
                )));
            }
        }

        let unit_agnostic = match doc.unit_agnostic {
            Some(raw) => raw
                .iter()
                .map(|p| p.parse::<Permission>())
                .collect::<Result<BTreeSet<_>>>()?,
            None => DEFAULT_UNIT_AGNOSTIC.iter().copied().collect(),
        };

        let table = Self::new(grants, unit_agnostic)?;
        debug!("Parsed grant table with {} grants", table.len());
        Ok(table)
    }

    /// Reads and parses a grant table document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let table = Self::from_json(&json)?;
        info!("Loaded grant table from {}", path.display());
        Ok(table)
    }

    /// Full permission set held by `role`
    pub fn permissions_for(&self, role: Role) -> &BTreeSet<Permission> {
        // `new` and `builtin` guarantee an entry for every role.
        &self.grants[&role]
    }

    /// Whether `role` holds `permission`
    pub fn grants(&self, role: Role, permission: Permission) -> bool {
        self.permissions_for(role).contains(&permission)
    }

    /// Whether `permission` ignores unit narrowing
    pub fn is_unit_agnostic(&self, permission: Permission) -> bool {
        self.unit_agnostic.contains(&permission)
    }

    pub fn unit_agnostic(&self) -> &BTreeSet<Permission> {
        &self.unit_agnostic
    }

    /// Total number of (role, permission) grants
    pub fn len(&self) -> usize {
        self.grants.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GrantTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_has_every_role() {
        let table = GrantTable::builtin();
        for role in Role::ALL {
            assert!(!table.permissions_for(role).is_empty(), "{} is empty", role);
        }
    }

    #[test]
    fn test_builtin_passes_validation() {
        let table = GrantTable::builtin();
        let rebuilt = GrantTable::new(table.grants.clone(), table.unit_agnostic.clone()).unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_super_admin_holds_everything() {
        let table = GrantTable::builtin();
        assert_eq!(
            table.permissions_for(Role::SuperAdmin).len(),
            Permission::ALL.len()
        );
    }

    #[test]
    fn test_builtin_spot_checks() {
        let table = GrantTable::builtin();
        assert!(table.grants(Role::TenantAdmin, Permission::ExpensesWrite));
        assert!(table.grants(Role::Resident, Permission::TicketsCreate));
        assert!(!table.grants(Role::Operator, Permission::PaymentsSubmit));
        assert!(!table.grants(Role::TenantOwner, Permission::PlansApprove));
        assert!(!table.grants(Role::Resident, Permission::TicketsManage));
        assert!(table.is_unit_agnostic(Permission::CommunicationsRead));
        assert!(!table.is_unit_agnostic(Permission::TicketsCreate));
    }

    #[test]
    fn test_new_rejects_missing_role() {
        let mut grants = GrantTable::builtin().grants;
        grants.remove(&Role::Operator);
        assert!(matches!(
            GrantTable::new(grants, BTreeSet::new()),
            Err(AuthzError::InvalidGrantTable(_))
        ));
    }

    #[test]
    fn test_new_rejects_empty_role() {
        let mut grants = GrantTable::builtin().grants;
        grants.insert(Role::Resident, BTreeSet::new());
        let err = GrantTable::new(grants, BTreeSet::new()).unwrap_err();
        assert!(err.to_string().contains("RESIDENT"));
    }

    fn document(resident: &str) -> String {
        format!(
            r#"{{
                "grants": {{
                    "SUPER_ADMIN": ["tenants.manage", "plans.approve"],
                    "TENANT_OWNER": ["properties.write"],
                    "TENANT_ADMIN": ["properties.write"],
                    "OPERATOR": ["tickets.manage"],
                    "RESIDENT": [{}]
                }}
            }}"#,
            resident
        )
    }

    #[test]
    fn test_from_json() {
        let table = GrantTable::from_json(&document(r#""tickets.create""#)).unwrap();
        assert!(table.grants(Role::Resident, Permission::TicketsCreate));
        assert!(!table.grants(Role::Resident, Permission::TicketsRead));
        assert_eq!(table.len(), 6);
        // Omitted unit_agnostic falls back to the default set
        assert!(table.is_unit_agnostic(Permission::CommunicationsRead));
    }

    #[test]
    fn test_from_json_unknown_permission() {
        let err = GrantTable::from_json(&document(r#""tickets.creat""#)).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidPermission(ref p) if p == "tickets.creat"));
    }

    #[test]
    fn test_from_json_empty_role() {
        let err = GrantTable::from_json(&document("")).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidGrantTable(_)));
    }

    #[test]
    fn test_from_json_unknown_role() {
        let json = r#"{"grants": {"GUEST": ["tickets.read"]}}"#;
        assert!(matches!(
            GrantTable::from_json(json),
            Err(AuthzError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            GrantTable::from_json("{not json"),
            Err(AuthzError::InvalidGrantTable(_))
        ));
    }

    #[test]
    fn test_from_json_explicit_unit_agnostic() {
        let json = document(r#""tickets.create""#).replacen(
            "\"grants\"",
            "\"unit_agnostic\": [\"tickets.create\"], \"grants\"",
            1,
        );
        let table = GrantTable::from_json(&json).unwrap();
        assert!(table.is_unit_agnostic(Permission::TicketsCreate));
        assert!(!table.is_unit_agnostic(Permission::CommunicationsRead));
    }

    #[test]
    fn test_from_json_empty_unit_agnostic_is_respected() {
        let json = document(r#""tickets.create""#)
            .replacen("\"grants\"", "\"unit_agnostic\": [], \"grants\"", 1);
        let table = GrantTable::from_json(&json).unwrap();
        assert!(table.unit_agnostic().is_empty());
        assert!(!table.is_unit_agnostic(Permission::CommunicationsRead));
    }

    #[test]
    fn test_from_json_rejects_unknown_top_level_key() {
        // A misspelled key must not fall back to the default unit-agnostic set
        let json = document(r#""tickets.create""#)
            .replacen("\"grants\"", "\"unit_agnostik\": [], \"grants\"", 1);
        let err = GrantTable::from_json(&json).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidGrantTable(ref msg) if msg.contains("unit_agnostik")));
    }

    #[test]
    fn test_from_json_rejects_duplicate_role() {
        let json = document(r#""payments.submit""#).replacen(
            "\"RESIDENT\"",
            "\"RESIDENT\": [\"tickets.read\"], \"RESIDENT\"",
            1,
        );
        let err = GrantTable::from_json(&json).unwrap_err();
        assert!(matches!(err, AuthzError::InvalidGrantTable(ref msg) if msg.contains("RESIDENT")));
    }

    #[test]
    fn test_from_json_grants_must_be_object() {
        let json = r#"{"grants": [["RESIDENT", ["tickets.read"]]]}"#;
        assert!(matches!(
            GrantTable::from_json(json),
            Err(AuthzError::InvalidGrantTable(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(document(r#""payments.submit""#).as_bytes()).unwrap();

        let table = GrantTable::load(file.path()).unwrap();
        assert!(table.grants(Role::Resident, Permission::PaymentsSubmit));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            GrantTable::load("/nonexistent/grants.json"),
            Err(AuthzError::Io(_))
        ));
    }
}
