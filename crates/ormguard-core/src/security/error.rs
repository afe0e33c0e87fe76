//! Security-specific error types.

use std::fmt;
use thiserror::Error;

/// Kind of permission an access check was about.
///
/// Only attribute reads fail hard; every other check denies through its
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionType {
    /// Entity attribute read.
    EntityAttribute,
}

impl fmt::Display for PermissionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionType::EntityAttribute => write!(f, "entity attribute"),
        }
    }
}

/// Security-related errors.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Access to the target was denied and the caller cannot continue.
    #[error("access denied: {permission} {target}")]
    AccessDenied {
        /// Kind of permission that was checked.
        permission: PermissionType,
        /// Entity, attribute path or resource name.
        target: String,
    },

    /// Role definition is invalid.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Policy could not be stored or loaded.
    #[error("policy serialization error: {0}")]
    PolicySerialization(String),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Metadata, storage or configuration error.
    #[error(transparent)]
    Core(#[from] crate::error::Error),
}

impl SecurityError {
    /// Create an access denied error.
    pub fn access_denied(permission: PermissionType, target: impl Into<String>) -> Self {
        SecurityError::AccessDenied {
            permission,
            target: target.into(),
        }
    }
}

impl From<sled::Error> for SecurityError {
    fn from(e: sled::Error) -> Self {
        SecurityError::Core(e.into())
    }
}

/// Result type for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SecurityError::access_denied(PermissionType::EntityAttribute, "Order.total");
        assert_eq!(err.to_string(), "access denied: entity attribute Order.total");

        let err = SecurityError::Core(crate::error::Error::UnknownEntity("Invoice".into()));
        assert!(err.to_string().contains("Invoice"));
    }

    #[test]
    fn test_security_result() {
        let ok: SecurityResult<i32> = Ok(42);
        assert_eq!(ok.unwrap(), 42);

        let err: SecurityResult<i32> = Err(SecurityError::InvalidRole("empty code".into()));
        assert!(err.is_err());
    }
}
