//! Policy indexes.
//!
//! Turns the flat policy lists of an authentication into lookup maps keyed by
//! entity name, `entity.attribute`, or resource name. Each index is built on
//! first use and then only read for the lifetime of the authentication.
//!
//! Within a key, policies keep their original order and duplicates are not
//! collapsed: decision functions scan the whole bucket.

use super::policy::{ResourcePolicy, ResourcePolicyType};
use super::row_level::RowLevelPolicy;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Policies grouped by lookup key.
#[derive(Debug)]
pub struct PolicyIndex<T> {
    by_key: HashMap<String, Vec<Arc<T>>>,
}

impl<T> Default for PolicyIndex<T> {
    fn default() -> Self {
        Self {
            by_key: HashMap::new(),
        }
    }
}

impl<T> PolicyIndex<T> {
    /// Group policies by the key returned from `key_fn`.
    pub fn build<'a, I, F>(policies: I, key_fn: F) -> Self
    where
        I: IntoIterator<Item = &'a Arc<T>>,
        T: 'a,
        F: Fn(&T) -> &str,
    {
        let mut by_key: HashMap<String, Vec<Arc<T>>> = HashMap::new();
        for policy in policies {
            by_key
                .entry(key_fn(&**policy).to_string())
                .or_default()
                .push(policy.clone());
        }
        Self { by_key }
    }

    /// Policies stored under `key`, empty if there are none.
    pub fn get(&self, key: &str) -> &[Arc<T>] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.by_key.len()
    }

    /// Total number of indexed policies.
    pub fn policy_count(&self) -> usize {
        self.by_key.values().map(Vec::len).sum()
    }
}

/// Build an index over the resource policies of one type, keyed by resource.
pub fn build_resource_index(
    policies: &[Arc<ResourcePolicy>],
    policy_type: ResourcePolicyType,
) -> PolicyIndex<ResourcePolicy> {
    let index = PolicyIndex::build(
        policies.iter().filter(|p| p.policy_type == policy_type),
        |p| p.resource.as_str(),
    );
    trace!(
        ?policy_type,
        keys = index.key_count(),
        policies = index.policy_count(),
        "built resource policy index"
    );
    index
}

/// Build an index over row-level policies, keyed by entity.
pub fn build_row_level_index(policies: &[Arc<RowLevelPolicy>]) -> PolicyIndex<RowLevelPolicy> {
    let index = PolicyIndex::build(policies.iter(), |p| p.entity.as_str());
    trace!(
        keys = index.key_count(),
        policies = index.policy_count(),
        "built row-level policy index"
    );
    index
}

/// The full set of lazily built indexes for one authentication.
#[derive(Debug, Default)]
pub struct PolicyIndexes {
    resource_policies: Vec<Arc<ResourcePolicy>>,
    row_level_policies: Vec<Arc<RowLevelPolicy>>,
    entity: OnceLock<PolicyIndex<ResourcePolicy>>,
    entity_attribute: OnceLock<PolicyIndex<ResourcePolicy>>,
    specific: OnceLock<PolicyIndex<ResourcePolicy>>,
    graphql: OnceLock<PolicyIndex<ResourcePolicy>>,
    row_level: OnceLock<PolicyIndex<RowLevelPolicy>>,
}

impl PolicyIndexes {
    /// Wrap policy lists; no index is built yet.
    pub fn new(
        resource_policies: Vec<Arc<ResourcePolicy>>,
        row_level_policies: Vec<Arc<RowLevelPolicy>>,
    ) -> Self {
        Self {
            resource_policies,
            row_level_policies,
            ..Self::default()
        }
    }

    /// All resource policies.
    pub fn resource_policies(&self) -> &[Arc<ResourcePolicy>] {
        &self.resource_policies
    }

    /// All row-level policies.
    pub fn row_level_policies(&self) -> &[Arc<RowLevelPolicy>] {
        &self.row_level_policies
    }

    /// Entity policies by entity name.
    pub fn entity(&self) -> &PolicyIndex<ResourcePolicy> {
        self.entity.get_or_init(|| {
            build_resource_index(&self.resource_policies, ResourcePolicyType::Entity)
        })
    }

    /// Attribute policies by `entity.attribute`.
    pub fn entity_attribute(&self) -> &PolicyIndex<ResourcePolicy> {
        self.entity_attribute.get_or_init(|| {
            build_resource_index(&self.resource_policies, ResourcePolicyType::EntityAttribute)
        })
    }

    /// Specific policies by resource name.
    pub fn specific(&self) -> &PolicyIndex<ResourcePolicy> {
        self.specific.get_or_init(|| {
            build_resource_index(&self.resource_policies, ResourcePolicyType::Specific)
        })
    }

    /// GraphQL policies by resource name.
    pub fn graphql(&self) -> &PolicyIndex<ResourcePolicy> {
        self.graphql.get_or_init(|| {
            build_resource_index(&self.resource_policies, ResourcePolicyType::GraphQl)
        })
    }

    /// Row-level policies by entity name.
    pub fn row_level(&self) -> &PolicyIndex<RowLevelPolicy> {
        self.row_level
            .get_or_init(|| build_row_level_index(&self.row_level_policies))
    }

    /// Check if the entity index has been built.
    pub fn is_entity_index_built(&self) -> bool {
        self.entity.get().is_some()
    }
}
