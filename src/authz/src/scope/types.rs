//! Scope type definitions and validation

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuthzError, Result};

/// Tenant / property / unit boundary
///
/// `tenant_id` is mandatory. `property_id` and `unit_id` narrow the boundary
/// when present. All identifiers are non-empty once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawScope")]
pub struct Scope {
    tenant_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    property_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    unit_id: Option<String>,
}

/// Unvalidated wire form
#[derive(Deserialize)]
struct RawScope {
    tenant_id: String,
    #[serde(default)]
    property_id: Option<String>,
    #[serde(default)]
    unit_id: Option<String>,
}

impl TryFrom<RawScope> for Scope {
    type Error = AuthzError;

    fn try_from(raw: RawScope) -> Result<Self> {
        Scope::from_parts(raw.tenant_id, raw.property_id, raw.unit_id)
    }
}

fn validate_id(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(AuthzError::InvalidScope(format!("{} cannot be empty", field)));
    }
    Ok(value)
}

impl Scope {
    /// Creates a tenant-wide scope
    pub fn tenant(tenant_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            tenant_id: validate_id("tenant_id", tenant_id.into())?,
            property_id: None,
            unit_id: None,
        })
    }

    /// Builds a scope from optional narrowing identifiers
    pub fn from_parts(
        tenant_id: impl Into<String>,
        property_id: Option<String>,
        unit_id: Option<String>,
    ) -> Result<Self> {
        let mut scope = Scope::tenant(tenant_id)?;
        if let Some(property_id) = property_id {
            scope = scope.with_property(property_id)?;
        }
        if let Some(unit_id) = unit_id {
            scope = scope.with_unit(unit_id)?;
        }
        Ok(scope)
    }

    /// Narrows the scope to a property
    pub fn with_property(mut self, property_id: impl Into<String>) -> Result<Self> {
        self.property_id = Some(validate_id("property_id", property_id.into())?);
        Ok(self)
    }

    /// Narrows the scope to a unit
    pub fn with_unit(mut self, unit_id: impl Into<String>) -> Result<Self> {
        self.unit_id = Some(validate_id("unit_id", unit_id.into())?);
        Ok(self)
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn property_id(&self) -> Option<&str> {
        self.property_id.as_deref()
    }

    pub fn unit_id(&self) -> Option<&str> {
        self.unit_id.as_deref()
    }

    /// Whether the scope is pinned to a single unit
    pub fn is_unit_bound(&self) -> bool {
        self.unit_id.is_some()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tenant:{}", self.tenant_id)?;
        if let Some(property_id) = &self.property_id {
            write!(f, ":property:{}", property_id)?;
        }
        if let Some(unit_id) = &self.unit_id {
            write!(f, ":unit:{}", unit_id)?;
        }
        Ok(())
    }
}
