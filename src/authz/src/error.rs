//! Error types for the authorization engine

use thiserror::Error;

use crate::engine::decision::ReasonCode;

/// Authorization engine errors
///
/// These signal a malformed question, not a denial. A well-formed check that
/// fails is returned as [`crate::Decision::Deny`] instead.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Role string is not one of the enumerated roles
    #[error("Invalid role: {0:?}")]
    InvalidRole(String),

    /// Permission string is not one of the enumerated permissions
    #[error("Invalid permission: {0:?}")]
    InvalidPermission(String),

    /// Scope is missing its tenant or carries an empty identifier
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Grant table document violates a table invariant
    #[error("Invalid grant table: {0}")]
    InvalidGrantTable(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AuthzError {
    /// Reason code for input-validation failures, if this error has one
    pub fn reason_code(&self) -> Option<ReasonCode> {
        match self {
            Self::InvalidRole(_) => Some(ReasonCode::InvalidRole),
            Self::InvalidPermission(_) => Some(ReasonCode::InvalidPermission),
            _ => None,
        }
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
