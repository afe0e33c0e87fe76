//! Authenticated principal and its policies.
//!
//! A `SecuredAuthentication` is created once per login. It owns the
//! principal's policies and the indexes built from them, so replacing the
//! authentication is the only way indexes are invalidated.

use super::index::PolicyIndexes;
use super::policy::ResourcePolicy;
use super::row_level::RowLevelPolicy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Identity of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserDetails {
    /// Login name.
    pub username: String,
    /// Stable user key; usually a UUID.
    pub key: String,
}

impl UserDetails {
    /// Create user details.
    pub fn new(username: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            key: key.into(),
        }
    }
}

/// Authentication carrying the principal's resource and row-level policies.
#[derive(Debug)]
pub struct SecuredAuthentication {
    user: UserDetails,
    role_codes: Vec<String>,
    indexes: PolicyIndexes,
}

impl SecuredAuthentication {
    /// Create an authentication. Indexes are built on first lookup.
    pub fn new(
        user: UserDetails,
        resource_policies: Vec<ResourcePolicy>,
        row_level_policies: Vec<RowLevelPolicy>,
    ) -> Self {
        Self {
            user,
            role_codes: Vec::new(),
            indexes: PolicyIndexes::new(
                resource_policies.into_iter().map(Arc::new).collect(),
                row_level_policies.into_iter().map(Arc::new).collect(),
            ),
        }
    }

    /// Record the role codes this authentication was built from.
    pub fn with_role_codes(mut self, role_codes: Vec<String>) -> Self {
        self.role_codes = role_codes;
        self
    }

    /// Authenticated user.
    pub fn user(&self) -> &UserDetails {
        &self.user
    }

    /// Role codes the policies were collected from.
    pub fn role_codes(&self) -> &[String] {
        &self.role_codes
    }

    /// Policy indexes of this authentication.
    pub fn indexes(&self) -> &PolicyIndexes {
        &self.indexes
    }
}

/// Source of the authentication for the operation being checked.
pub trait CurrentAuthentication: Send + Sync {
    /// Current authentication, or `None` when nobody is logged in.
    fn authentication(&self) -> Option<Arc<SecuredAuthentication>>;

    /// Current user, if authenticated.
    fn current_user(&self) -> Option<UserDetails> {
        self.authentication().map(|a| a.user().clone())
    }

    /// Check if an authentication is present.
    fn is_set(&self) -> bool {
        self.authentication().is_some()
    }
}

/// Swappable holder for the current authentication.
///
/// Logging in replaces the held `Arc`; requests that already cloned the old
/// authentication keep using it and its indexes until they finish.
#[derive(Debug, Default)]
pub struct AuthenticationHolder {
    current: RwLock<Option<Arc<SecuredAuthentication>>>,
}

impl AuthenticationHolder {
    /// Create an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a holder with an initial authentication.
    pub fn with(authentication: SecuredAuthentication) -> Self {
        let holder = Self::new();
        holder.set(authentication);
        holder
    }

    /// Replace the current authentication.
    pub fn set(&self, authentication: SecuredAuthentication) -> Arc<SecuredAuthentication> {
        debug!(user = %authentication.user().username, "authentication set");
        let authentication = Arc::new(authentication);
        *self.current.write() = Some(authentication.clone());
        authentication
    }

    /// Remove the current authentication.
    pub fn clear(&self) {
        *self.current.write() = None;
    }
}

impl CurrentAuthentication for AuthenticationHolder {
    fn authentication(&self) -> Option<Arc<SecuredAuthentication>> {
        self.current.read().clone()
    }
}

impl<T: CurrentAuthentication + ?Sized> CurrentAuthentication for &T {
    fn authentication(&self) -> Option<Arc<SecuredAuthentication>> {
        (**self).authentication()
    }
}
