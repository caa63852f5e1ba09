//! Resource boundary an authorization check is evaluated within
//!
//! A scope always names a tenant and may narrow to a property and a unit.
//!
//! # Examples
//!
//! ```
//! use estatedesk_authz::scope::Scope;
//!
//! let scope = Scope::tenant("T1").unwrap().with_unit("U1").unwrap();
//! assert!(scope.is_unit_bound());
//! assert_eq!(scope.tenant_id(), "T1");
//! ```

mod types;


pub use types::Scope;
