//! Permission decisions.
//!
//! All checks are pure functions of the requested operation and the policies
//! returned by a [`PolicyStore`]. Access is denied unless an `Allow` policy
//! covers the requested action.

use super::policy::{PolicyAction, PolicyEffect, ResourcePolicy, WILDCARD};
use super::store::PolicyStore;
use crate::metadata::{MetaClass, MetaPropertyPath};

/// Decision functions for entity, attribute and operation permissions.
pub struct SecureOperations;

impl SecureOperations {
    /// Check if instances of the entity may be created.
    pub fn is_entity_create_permitted(meta_class: &MetaClass, store: &dyn PolicyStore) -> bool {
        Self::is_entity_permitted(&meta_class.name, PolicyAction::Create, store)
    }

    /// Check if instances of the entity may be read.
    pub fn is_entity_read_permitted(meta_class: &MetaClass, store: &dyn PolicyStore) -> bool {
        Self::is_entity_permitted(&meta_class.name, PolicyAction::Read, store)
    }

    /// Check if instances of the entity may be updated.
    pub fn is_entity_update_permitted(meta_class: &MetaClass, store: &dyn PolicyStore) -> bool {
        Self::is_entity_permitted(&meta_class.name, PolicyAction::Update, store)
    }

    /// Check if instances of the entity may be deleted.
    pub fn is_entity_delete_permitted(meta_class: &MetaClass, store: &dyn PolicyStore) -> bool {
        Self::is_entity_permitted(&meta_class.name, PolicyAction::Delete, store)
    }

    /// Check an entity action by entity name.
    pub fn is_entity_permitted(entity: &str, action: PolicyAction, store: &dyn PolicyStore) -> bool {
        store
            .entity_resource_policies(entity)
            .iter()
            .any(|p| p.allows(action))
    }

    /// Check if every attribute along the path may be read.
    pub fn is_entity_attr_read_permitted(path: &MetaPropertyPath, store: &dyn PolicyStore) -> bool {
        Self::is_path_permitted(path, PolicyAction::Read, store)
    }

    /// Check if every attribute along the path may be updated.
    pub fn is_entity_attr_update_permitted(
        path: &MetaPropertyPath,
        store: &dyn PolicyStore,
    ) -> bool {
        Self::is_path_permitted(path, PolicyAction::Update, store)
    }

    fn is_path_permitted(path: &MetaPropertyPath, action: PolicyAction, store: &dyn PolicyStore) -> bool {
        !path.is_empty()
            && path
                .meta_properties()
                .iter()
                .all(|p| Self::is_entity_attr_permitted(&p.domain, &p.name, action, store))
    }

    /// Check a single attribute of an entity.
    ///
    /// Policies for the exact attribute decide on their own when any exist;
    /// the `*` attribute is consulted only when there are none.
    pub fn is_entity_attr_permitted(
        entity: &str,
        attribute: &str,
        action: PolicyAction,
        store: &dyn PolicyStore,
    ) -> bool {
        let mut policies = store.entity_attribute_resource_policies(entity, attribute);
        if policies.is_empty() && attribute != WILDCARD {
            policies = store.entity_attribute_resource_policies(entity, WILDCARD);
        }
        policies.iter().any(|p| Self::attr_policy_allows(p, action))
    }

    // Update access to an attribute implies read access.
    fn attr_policy_allows(policy: &ResourcePolicy, action: PolicyAction) -> bool {
        if policy.effect != PolicyEffect::Allow {
            return false;
        }
        match action {
            PolicyAction::Read => matches!(
                policy.action,
                PolicyAction::Read | PolicyAction::Update | PolicyAction::All
            ),
            other => policy.action.covers(other),
        }
    }

    /// Check if a named operation may be invoked.
    pub fn is_specific_permitted(resource: &str, store: &dyn PolicyStore) -> bool {
        store
            .specific_resource_policies(resource)
            .iter()
            .any(|p| p.effect == PolicyEffect::Allow)
    }

    /// Check if a GraphQL operation may be invoked.
    pub fn is_graphql_permitted(resource: &str, store: &dyn PolicyStore) -> bool {
        store
            .graphql_resource_policies(resource)
            .iter()
            .any(|p| p.effect == PolicyEffect::Allow)
    }
}
