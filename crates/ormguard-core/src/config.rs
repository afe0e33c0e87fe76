//! Security configuration.
//!
//! A single JSON document declares the entity metadata, the roles and the
//! user assignments:
//!
//! ```json
//! {
//!   "query_parameter_prefix": "current_user_",
//!   "entities": [
//!     { "name": "Order", "properties": [
//!       { "name": "number", "range": { "kind": "datatype", "datatype": "string" } }
//!     ] }
//!   ],
//!   "resource_roles": [
//!     { "code": "order-reader", "policies": [
//!       { "type": "entity", "resource": "Order", "action": "read" }
//!     ] }
//!   ],
//!   "row_level_roles": [],
//!   "users": [ { "username": "alice", "key": "1", "roles": ["order-reader"] } ]
//! }
//! ```

use crate::error::{Error, Result};
use crate::metadata::{MetaClass, Metadata};
use crate::security::query_params::DEFAULT_PREFIX;
use crate::security::{
    InMemoryRoleRepository, ResourceRole, RoleAuthenticator, RowLevelRole, SecuredAuthentication,
    SecurityError, SecurityResult, UserDetails,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

/// A user and the roles assigned to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAssignment {
    /// Login name.
    pub username: String,
    /// User key, usually a UUID.
    #[serde(default)]
    pub key: String,
    /// Assigned role codes.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserAssignment {
    /// User details for authentication.
    pub fn details(&self) -> UserDetails {
        UserDetails::new(self.username.clone(), self.key.clone())
    }
}

/// Declarative security configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Prefix of predefined query parameters.
    #[serde(default = "default_prefix")]
    pub query_parameter_prefix: String,
    /// Entity metadata.
    #[serde(default)]
    pub entities: Vec<MetaClass>,
    /// Resource roles.
    #[serde(default)]
    pub resource_roles: Vec<ResourceRole>,
    /// Row-level roles. Only JPQL policies can be declared here.
    #[serde(default)]
    pub row_level_roles: Vec<RowLevelRole>,
    /// User assignments.
    #[serde(default)]
    pub users: Vec<UserAssignment>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            query_parameter_prefix: default_prefix(),
            entities: Vec::new(),
            resource_roles: Vec::new(),
            row_level_roles: Vec::new(),
            users: Vec::new(),
        }
    }
}

impl SecurityConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SecurityConfig =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(
            path = %path.display(),
            entities = config.entities.len(),
            resource_roles = config.resource_roles.len(),
            row_level_roles = config.row_level_roles.len(),
            users = config.users.len(),
            "security configuration loaded"
        );
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Reject duplicate names and codes.
    pub fn validate(&self) -> Result<()> {
        check_unique("entity", self.entities.iter().map(|e| e.name.as_str()))?;
        check_unique("resource role", self.resource_roles.iter().map(|r| r.code.as_str()))?;
        check_unique("row-level role", self.row_level_roles.iter().map(|r| r.code.as_str()))?;
        check_unique("user", self.users.iter().map(|u| u.username.as_str()))?;

        if self.query_parameter_prefix.is_empty() {
            return Err(Error::Config("query parameter prefix must not be empty".into()));
        }
        Ok(())
    }

    /// Entity metadata registry.
    pub fn metadata(&self) -> Metadata {
        Metadata::from_classes(self.entities.iter().cloned())
    }

    /// Repository holding the declared roles.
    pub fn role_repository(&self) -> SecurityResult<InMemoryRoleRepository> {
        let repository = InMemoryRoleRepository::new();
        for role in &self.resource_roles {
            repository.add_resource_role(role.clone())?;
        }
        for role in &self.row_level_roles {
            repository.add_row_level_role(role.clone())?;
        }
        Ok(repository)
    }

    /// Authenticator over the declared roles.
    pub fn authenticator(&self) -> SecurityResult<RoleAuthenticator> {
        Ok(RoleAuthenticator::new().with_repository(Arc::new(self.role_repository()?)))
    }

    /// Find a user assignment.
    pub fn user(&self, username: &str) -> Option<&UserAssignment> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Authenticate a declared user against `authenticator`.
    pub fn authenticate(
        &self,
        authenticator: &RoleAuthenticator,
        username: &str,
    ) -> SecurityResult<SecuredAuthentication> {
        let user = self.user(username).ok_or_else(|| {
            SecurityError::AuthenticationFailed(format!("unknown user '{}'", username))
        })?;
        authenticator.authenticate(user.details(), &user.roles)
    }
}

fn check_unique<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::Config(format!("duplicate {} '{}'", kind, name)));
        }
    }
    Ok(())
}
