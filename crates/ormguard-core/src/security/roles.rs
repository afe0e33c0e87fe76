//! Roles and role-based authentication.
//!
//! Policies are granted to users through roles. A resource role bundles
//! resource policies, a row-level role bundles row-level policies, and both
//! may include child roles. Authenticating a user collects the policies of
//! every role reachable from the assigned codes.

use super::authentication::{SecuredAuthentication, UserDetails};
use super::error::{SecurityError, SecurityResult};
use super::policy::ResourcePolicy;
use super::row_level::RowLevelPolicy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Role granting resource policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRole {
    /// Unique role code.
    pub code: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Granted policies.
    #[serde(default)]
    pub policies: Vec<ResourcePolicy>,
    /// Codes of included resource roles.
    #[serde(default)]
    pub child_roles: Vec<String>,
}

impl ResourceRole {
    /// Create an empty role.
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
            policies: Vec::new(),
            child_roles: Vec::new(),
        }
    }

    /// Add a policy.
    pub fn with_policy(mut self, policy: ResourcePolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Include another resource role.
    pub fn with_child(mut self, code: impl Into<String>) -> Self {
        self.child_roles.push(code.into());
        self
    }
}

/// Role granting row-level policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowLevelRole {
    /// Unique role code.
    pub code: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Granted policies.
    #[serde(default)]
    pub policies: Vec<RowLevelPolicy>,
    /// Codes of included row-level roles.
    #[serde(default)]
    pub child_roles: Vec<String>,
}

impl RowLevelRole {
    /// Create an empty role.
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code,
            policies: Vec::new(),
            child_roles: Vec::new(),
        }
    }

    /// Add a policy.
    pub fn with_policy(mut self, policy: RowLevelPolicy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Include another row-level role.
    pub fn with_child(mut self, code: impl Into<String>) -> Self {
        self.child_roles.push(code.into());
        self
    }
}

pub(crate) fn validate_code(code: &str) -> SecurityResult<()> {
    if code.trim().is_empty() {
        return Err(SecurityError::InvalidRole("role code must not be empty".into()));
    }
    Ok(())
}

/// Source of role definitions.
pub trait RoleRepository: Send + Sync {
    /// Look up a resource role by code.
    fn resource_role(&self, code: &str) -> SecurityResult<Option<ResourceRole>>;

    /// Look up a row-level role by code.
    fn row_level_role(&self, code: &str) -> SecurityResult<Option<RowLevelRole>>;
}

/// Roles registered in code. Row-level predicate policies can only live here.
#[derive(Debug, Default)]
pub struct InMemoryRoleRepository {
    resource_roles: RwLock<HashMap<String, ResourceRole>>,
    row_level_roles: RwLock<HashMap<String, RowLevelRole>>,
}

impl InMemoryRoleRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource role, replacing one with the same code.
    pub fn add_resource_role(&self, role: ResourceRole) -> SecurityResult<()> {
        validate_code(&role.code)?;
        self.resource_roles.write().insert(role.code.clone(), role);
        Ok(())
    }

    /// Register a row-level role, replacing one with the same code.
    pub fn add_row_level_role(&self, role: RowLevelRole) -> SecurityResult<()> {
        validate_code(&role.code)?;
        self.row_level_roles.write().insert(role.code.clone(), role);
        Ok(())
    }
}

impl RoleRepository for InMemoryRoleRepository {
    fn resource_role(&self, code: &str) -> SecurityResult<Option<ResourceRole>> {
        Ok(self.resource_roles.read().get(code).cloned())
    }

    fn row_level_role(&self, code: &str) -> SecurityResult<Option<RowLevelRole>> {
        Ok(self.row_level_roles.read().get(code).cloned())
    }
}

/// Builds authentications from role assignments.
///
/// Repositories are consulted in order; the first one that knows a code wins.
#[derive(Clone, Default)]
pub struct RoleAuthenticator {
    repositories: Vec<Arc<dyn RoleRepository>>,
}

impl RoleAuthenticator {
    /// Create an authenticator without repositories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a repository.
    pub fn with_repository(mut self, repository: Arc<dyn RoleRepository>) -> Self {
        self.repositories.push(repository);
        self
    }

    fn find_resource_role(&self, code: &str) -> SecurityResult<Option<ResourceRole>> {
        for repository in &self.repositories {
            if let Some(role) = repository.resource_role(code)? {
                return Ok(Some(role));
            }
        }
        Ok(None)
    }

    fn find_row_level_role(&self, code: &str) -> SecurityResult<Option<RowLevelRole>> {
        for repository in &self.repositories {
            if let Some(role) = repository.row_level_role(code)? {
                return Ok(Some(role));
            }
        }
        Ok(None)
    }

    /// Authenticate a user holding the given role codes.
    ///
    /// A code may name a resource role, a row-level role or both. Child
    /// roles are expanded recursively whatever their kind, and each role
    /// contributes its policies once even if it is reachable along several
    /// paths. Codes that no repository knows are skipped.
    pub fn authenticate(
        &self,
        user: UserDetails,
        role_codes: &[String],
    ) -> SecurityResult<SecuredAuthentication> {
        let mut resource_policies = Vec::new();
        let mut row_level_policies = Vec::new();
        let mut effective = Vec::new();

        let mut visited = HashSet::new();
        let mut pending: Vec<String> = role_codes.iter().rev().cloned().collect();
        while let Some(code) = pending.pop() {
            if !visited.insert(code.clone()) {
                continue;
            }
            let resource_role = self.find_resource_role(&code)?;
            let row_level_role = self.find_row_level_role(&code)?;
            if resource_role.is_none() && row_level_role.is_none() {
                if role_codes.contains(&code) {
                    warn!(user = %user.username, role = %code, "assigned role not found");
                } else {
                    warn!(role = %code, "child role not found");
                }
                continue;
            }

            let mut children = Vec::new();
            if let Some(role) = resource_role {
                resource_policies.extend(role.policies);
                children.extend(role.child_roles);
            }
            if let Some(role) = row_level_role {
                row_level_policies.extend(role.policies);
                children.extend(role.child_roles);
            }
            pending.extend(children.into_iter().rev());
            effective.push(code);
        }

        debug!(
            user = %user.username,
            roles = effective.len(),
            resource_policies = resource_policies.len(),
            row_level_policies = row_level_policies.len(),
            "user authenticated"
        );

        Ok(SecuredAuthentication::new(user, resource_policies, row_level_policies)
            .with_role_codes(effective))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::policy::{PolicyAction, WILDCARD};
    use crate::security::row_level::RowLevelAction;

    fn repository() -> Arc<InMemoryRoleRepository> {
        let repo = InMemoryRoleRepository::new();
        repo.add_resource_role(
            ResourceRole::new("order-reader")
                .with_policy(ResourcePolicy::entity("Order", PolicyAction::Read))
                .with_policy(ResourcePolicy::entity_attribute(
                    "Order",
                    WILDCARD,
                    PolicyAction::Read,
                )),
        )
        .unwrap();
        repo.add_resource_role(
            ResourceRole::new("order-editor")
                .with_policy(ResourcePolicy::entity("Order", PolicyAction::Update))
                .with_child("order-reader"),
        )
        .unwrap();
        repo.add_resource_role(
            ResourceRole::new("cycle-a").with_child("cycle-b"),
        )
        .unwrap();
        repo.add_resource_role(
            ResourceRole::new("cycle-b")
                .with_policy(ResourcePolicy::specific("reports.run"))
                .with_child("cycle-a"),
        )
        .unwrap();
        repo.add_row_level_role(
            RowLevelRole::new("own-orders").with_policy(RowLevelPolicy::predicate(
                "Order",
                RowLevelAction::Read,
                |record, user| record.get_str("owner") == Some(user.username.as_str()),
            )),
        )
        .unwrap();
        Arc::new(repo)
    }

    #[test]
    fn test_child_roles_expanded() {
        let authenticator = RoleAuthenticator::new().with_repository(repository());
        let auth = authenticator
            .authenticate(UserDetails::new("alice", "1"), &["order-editor".to_string()])
            .unwrap();

        assert_eq!(auth.role_codes(), &["order-editor", "order-reader"]);
        assert_eq!(auth.indexes().entity().get("Order").len(), 2);
        assert_eq!(auth.indexes().entity_attribute().get("Order.*").len(), 1);
    }

    #[test]
    fn test_cycle_visited_once() {
        let authenticator = RoleAuthenticator::new().with_repository(repository());
        let auth = authenticator
            .authenticate(UserDetails::new("alice", "1"), &["cycle-a".to_string()])
            .unwrap();

        assert_eq!(auth.role_codes(), &["cycle-a", "cycle-b"]);
        assert_eq!(auth.indexes().specific().get("reports.run").len(), 1);
    }

    #[test]
    fn test_row_level_role_and_unknown_code() {
        let authenticator = RoleAuthenticator::new().with_repository(repository());
        let auth = authenticator
            .authenticate(
                UserDetails::new("alice", "1"),
                &["own-orders".to_string(), "missing".to_string()],
            )
            .unwrap();

        assert_eq!(auth.role_codes(), &["own-orders"]);
        assert_eq!(auth.indexes().row_level().get("Order").len(), 1);
        assert!(auth.indexes().resource_policies().is_empty());
    }

    #[test]
    fn test_row_level_child_of_resource_role() {
        let repo = repository();
        repo.add_resource_role(
            ResourceRole::new("order-owner")
                .with_policy(ResourcePolicy::entity("Order", PolicyAction::Read))
                .with_child("own-orders"),
        )
        .unwrap();

        let authenticator = RoleAuthenticator::new().with_repository(repo);
        let auth = authenticator
            .authenticate(UserDetails::new("alice", "1"), &["order-owner".to_string()])
            .unwrap();

        assert_eq!(auth.role_codes(), &["order-owner", "own-orders"]);
        assert_eq!(auth.indexes().entity().get("Order").len(), 1);
        assert_eq!(auth.indexes().row_level().get("Order").len(), 1);
    }

    #[test]
    fn test_first_repository_wins() {
        let override_repo = InMemoryRoleRepository::new();
        override_repo
            .add_resource_role(
                ResourceRole::new("order-reader")
                    .with_policy(ResourcePolicy::entity("Order", PolicyAction::All)),
            )
            .unwrap();

        let authenticator = RoleAuthenticator::new()
            .with_repository(Arc::new(override_repo))
            .with_repository(repository());
        let auth = authenticator
            .authenticate(UserDetails::new("alice", "1"), &["order-reader".to_string()])
            .unwrap();

        let policies = auth.indexes().entity().get("Order");
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].action, PolicyAction::All);
    }

    #[test]
    fn test_empty_code_rejected() {
        let repo = InMemoryRoleRepository::new();
        assert!(matches!(
            repo.add_resource_role(ResourceRole::new("  ")),
            Err(SecurityError::InvalidRole(_))
        ));
    }
}
