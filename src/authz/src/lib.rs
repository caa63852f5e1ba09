//! # EstateDesk Authorization Engine
//!
//! Role-based access control for the multi-tenant property management
//! platform.
//!
//! ## Features
//!
//! - **Closed vocabularies**: five roles and a fixed set of `resource.action`
//!   permissions, parsed and validated at the boundary
//! - **Immutable grant table** loaded once at start-up
//! - **Scope checks**: tenant binding and unit narrowing
//! - **Explicit denial reasons** kept apart from input errors
//! - **Caller-side audit log and metrics**
//!
//! ## Example
//!
//! ```rust
//! use estatedesk_authz::{AuthzEngine, Decision, DenyReason, Permission, Role, Scope};
//!
//! let engine = AuthzEngine::builtin();
//!
//! let principal = Scope::tenant("T1").unwrap().with_unit("U1").unwrap();
//! let requested = Scope::tenant("T1").unwrap().with_unit("U2").unwrap();
//!
//! let decision = engine.authorize(Role::Resident, Permission::TicketsCreate, &requested, &principal);
//! assert_eq!(decision, Decision::Deny(DenyReason::UnitMismatch));
//!
//! // String inputs are validated; unknown values are errors, not denials.
//! assert!(engine.check("GUEST", "tickets.create", &requested, &principal).is_err());
//! ```

pub mod types;
pub mod engine;
pub mod error;
pub mod grants;
pub mod scope;

// Re-export commonly used types
pub use types::{Permission, Role};
pub use engine::{
    AuditEntry, AuditLog, AuditOutcome, AuthRequest, AuthzEngine, Decision, DenyReason,
    MetricsCollector, ReasonCode,
};
pub use error::{AuthzError, Result};
pub use grants::GrantTable;
pub use scope::Scope;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
