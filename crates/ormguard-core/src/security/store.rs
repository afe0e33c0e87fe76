//! Read access to the current principal's policies.

use super::authentication::{CurrentAuthentication, SecuredAuthentication, UserDetails};
use super::index::PolicyIndex;
use super::policy::{attribute_key, ResourcePolicy, WILDCARD};
use super::row_level::RowLevelPolicy;
use std::sync::Arc;

/// Policy lookups used by the decision functions.
///
/// Every method returns an empty list, never an error, when nothing matches
/// or nobody is authenticated.
pub trait PolicyStore: Send + Sync {
    /// Row-level policies for an entity.
    fn row_level_policies(&self, entity: &str) -> Vec<Arc<RowLevelPolicy>>;

    /// Entity policies for an entity, including `*` entity policies.
    fn entity_resource_policies(&self, entity: &str) -> Vec<Arc<ResourcePolicy>>;

    /// Attribute policies for `entity.attribute`, including `*.attribute`.
    fn entity_attribute_resource_policies(
        &self,
        entity: &str,
        attribute: &str,
    ) -> Vec<Arc<ResourcePolicy>>;

    /// Specific policies for a resource, including `*` specific policies.
    fn specific_resource_policies(&self, resource: &str) -> Vec<Arc<ResourcePolicy>>;

    /// GraphQL policies for a resource, including `*` GraphQL policies.
    fn graphql_resource_policies(&self, resource: &str) -> Vec<Arc<ResourcePolicy>>;

    /// Capture the authentication this store currently reads from.
    ///
    /// A constraint evaluates one check against a single snapshot, so a login
    /// in between lookups cannot mix two principals' policies.
    fn snapshot(&self) -> PolicySnapshot;
}

/// Policies and identity of one authentication, fixed at capture time.
#[derive(Debug, Clone, Default)]
pub struct PolicySnapshot {
    authentication: Option<Arc<SecuredAuthentication>>,
}

impl PolicySnapshot {
    /// Snapshot of the given authentication; `None` means unauthenticated.
    pub fn new(authentication: Option<Arc<SecuredAuthentication>>) -> Self {
        Self { authentication }
    }

    /// User the policies belong to.
    pub fn user(&self) -> Option<&UserDetails> {
        self.authentication.as_deref().map(SecuredAuthentication::user)
    }

    /// Captured authentication.
    pub fn authentication(&self) -> Option<&Arc<SecuredAuthentication>> {
        self.authentication.as_ref()
    }

    fn lookup<T, F>(&self, select: F, keys: &[&str]) -> Vec<Arc<T>>
    where
        F: Fn(&SecuredAuthentication) -> &PolicyIndex<T>,
    {
        let Some(authentication) = self.authentication.as_deref() else {
            return Vec::new();
        };
        let index = select(authentication);
        let mut result = Vec::new();
        for (i, key) in keys.iter().enumerate() {
            // Skip a wildcard key that repeats an earlier key.
            if keys[..i].contains(key) {
                continue;
            }
            result.extend(index.get(key).iter().cloned());
        }
        result
    }
}

impl PolicyStore for PolicySnapshot {
    fn row_level_policies(&self, entity: &str) -> Vec<Arc<RowLevelPolicy>> {
        self.lookup(|a| a.indexes().row_level(), &[entity])
    }

    fn entity_resource_policies(&self, entity: &str) -> Vec<Arc<ResourcePolicy>> {
        self.lookup(|a| a.indexes().entity(), &[entity, WILDCARD])
    }

    fn entity_attribute_resource_policies(
        &self,
        entity: &str,
        attribute: &str,
    ) -> Vec<Arc<ResourcePolicy>> {
        let exact = attribute_key(entity, attribute);
        let any_entity = attribute_key(WILDCARD, attribute);
        self.lookup(|a| a.indexes().entity_attribute(), &[exact.as_str(), any_entity.as_str()])
    }

    fn specific_resource_policies(&self, resource: &str) -> Vec<Arc<ResourcePolicy>> {
        self.lookup(|a| a.indexes().specific(), &[resource, WILDCARD])
    }

    fn graphql_resource_policies(&self, resource: &str) -> Vec<Arc<ResourcePolicy>> {
        self.lookup(|a| a.indexes().graphql(), &[resource, WILDCARD])
    }

    fn snapshot(&self) -> PolicySnapshot {
        self.clone()
    }
}

/// Policy store backed by the current authentication's indexes.
pub struct AuthenticationPolicyStore {
    current: Arc<dyn CurrentAuthentication>,
}

impl AuthenticationPolicyStore {
    /// Create a store reading from the given authentication source.
    pub fn new(current: Arc<dyn CurrentAuthentication>) -> Self {
        Self { current }
    }
}

impl PolicyStore for AuthenticationPolicyStore {
    fn row_level_policies(&self, entity: &str) -> Vec<Arc<RowLevelPolicy>> {
        self.snapshot().row_level_policies(entity)
    }

    fn entity_resource_policies(&self, entity: &str) -> Vec<Arc<ResourcePolicy>> {
        self.snapshot().entity_resource_policies(entity)
    }

    fn entity_attribute_resource_policies(
        &self,
        entity: &str,
        attribute: &str,
    ) -> Vec<Arc<ResourcePolicy>> {
        self.snapshot().entity_attribute_resource_policies(entity, attribute)
    }

    fn specific_resource_policies(&self, resource: &str) -> Vec<Arc<ResourcePolicy>> {
        self.snapshot().specific_resource_policies(resource)
    }

    fn graphql_resource_policies(&self, resource: &str) -> Vec<Arc<ResourcePolicy>> {
        self.snapshot().graphql_resource_policies(resource)
    }

    fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot::new(self.current.authentication())
    }
}
