//! Resource policy definitions.
//!
//! A resource policy grants (or explicitly refuses) one action on an entity,
//! an entity attribute, or a named operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wildcard resource or attribute name.
pub const WILDCARD: &str = "*";

/// Kind of resource a policy is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourcePolicyType {
    /// Entity CRUD. Resource is the entity name.
    Entity,
    /// Entity attribute. Resource is `entity.attribute`.
    EntityAttribute,
    /// Named operation. Resource is the operation name.
    Specific,
    /// GraphQL operation. Resource is the operation name.
    #[serde(rename = "graphql")]
    GraphQl,
}

/// Action a policy applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyAction {
    /// Create an entity instance.
    Create,
    /// Read an entity or attribute.
    Read,
    /// Update an entity or attribute.
    Update,
    /// Delete an entity instance.
    Delete,
    /// Every action.
    #[serde(rename = "*", alias = "all")]
    All,
}

impl PolicyAction {
    /// Check if a policy with this action covers the requested action.
    pub fn covers(self, requested: PolicyAction) -> bool {
        self == PolicyAction::All || self == requested
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyAction::Create => write!(f, "create"),
            PolicyAction::Read => write!(f, "read"),
            PolicyAction::Update => write!(f, "update"),
            PolicyAction::Delete => write!(f, "delete"),
            PolicyAction::All => write!(f, "*"),
        }
    }
}

/// Outcome attached to a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyEffect {
    /// Grant the action.
    #[default]
    Allow,
    /// Do not grant the action.
    Deny,
}

/// A single resource policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePolicy {
    /// Kind of resource.
    #[serde(rename = "type")]
    pub policy_type: ResourcePolicyType,
    /// Entity name, `entity.attribute`, or operation name.
    pub resource: String,
    /// Action the policy applies to.
    #[serde(default = "default_action")]
    pub action: PolicyAction,
    /// Policy effect.
    #[serde(default)]
    pub effect: PolicyEffect,
}

fn default_action() -> PolicyAction {
    PolicyAction::All
}

impl ResourcePolicy {
    /// Create a policy with the `Allow` effect.
    pub fn new(
        policy_type: ResourcePolicyType,
        resource: impl Into<String>,
        action: PolicyAction,
    ) -> Self {
        Self {
            policy_type,
            resource: resource.into(),
            action,
            effect: PolicyEffect::Allow,
        }
    }

    /// Entity CRUD policy.
    pub fn entity(entity: impl Into<String>, action: PolicyAction) -> Self {
        Self::new(ResourcePolicyType::Entity, entity, action)
    }

    /// Entity attribute policy. `attribute` may be [`WILDCARD`].
    pub fn entity_attribute(
        entity: impl AsRef<str>,
        attribute: impl AsRef<str>,
        action: PolicyAction,
    ) -> Self {
        Self::new(
            ResourcePolicyType::EntityAttribute,
            attribute_key(entity.as_ref(), attribute.as_ref()),
            action,
        )
    }

    /// Specific operation policy.
    pub fn specific(resource: impl Into<String>) -> Self {
        Self::new(ResourcePolicyType::Specific, resource, PolicyAction::All)
    }

    /// GraphQL operation policy.
    pub fn graphql(resource: impl Into<String>) -> Self {
        Self::new(ResourcePolicyType::GraphQl, resource, PolicyAction::All)
    }

    /// Set the effect.
    pub fn with_effect(mut self, effect: PolicyEffect) -> Self {
        self.effect = effect;
        self
    }

    /// Set the effect to `Deny`.
    pub fn denied(self) -> Self {
        self.with_effect(PolicyEffect::Deny)
    }

    /// Check if the policy grants the requested action.
    pub fn allows(&self, requested: PolicyAction) -> bool {
        self.effect == PolicyEffect::Allow && self.action.covers(requested)
    }
}

/// Index key for an entity attribute: `entity.attribute`.
pub fn attribute_key(entity: &str, attribute: &str) -> String {
    format!("{entity}.{attribute}")
}
