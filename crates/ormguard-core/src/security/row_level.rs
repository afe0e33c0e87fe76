//! Row-level policy definitions.
//!
//! Row-level policies narrow which instances of an entity are visible or
//! writable. They come in two forms: an in-memory predicate evaluated against
//! loaded records, and JPQL fragments injected into read queries.

use super::authentication::UserDetails;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Action a row-level policy restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLevelAction {
    /// Creating instances.
    Create,
    /// Reading instances.
    Read,
    /// Updating instances.
    Update,
    /// Deleting instances.
    Delete,
}

impl Default for RowLevelAction {
    fn default() -> Self {
        RowLevelAction::Read
    }
}

/// Loaded entity instance that in-memory predicates are evaluated against.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EntityRecord {
    /// Entity name.
    pub entity: String,
    /// Attribute values by name.
    pub attributes: HashMap<String, serde_json::Value>,
}

impl EntityRecord {
    /// Create an empty record of the given entity.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            attributes: HashMap::new(),
        }
    }

    /// Set an attribute value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    /// Get an attribute as a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(|v| v.as_str())
    }
}

/// Predicate of a row-level policy, evaluated with the current user.
pub type RowPredicate = Arc<dyn Fn(&EntityRecord, &UserDetails) -> bool + Send + Sync>;

/// How a row-level policy is enforced.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowLevelPolicyKind {
    /// In-memory predicate. Only registrable in code.
    #[serde(skip)]
    Predicate(RowPredicate),
    /// JPQL fragments injected into read queries.
    Jpql {
        /// Join clause, e.g. `join {E}.customer c`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        join_clause: Option<String>,
        /// Where clause, e.g. `{E}.owner = :current_user_username`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        where_clause: Option<String>,
    },
}

impl fmt::Debug for RowLevelPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLevelPolicyKind::Predicate(_) => f.write_str("Predicate(..)"),
            RowLevelPolicyKind::Jpql {
                join_clause,
                where_clause,
            } => f
                .debug_struct("Jpql")
                .field("join_clause", join_clause)
                .field("where_clause", where_clause)
                .finish(),
        }
    }
}

/// A row-level policy for one entity and action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowLevelPolicy {
    /// Target entity name.
    pub entity: String,
    /// Action the policy restricts.
    #[serde(default)]
    pub action: RowLevelAction,
    /// Enforcement form.
    #[serde(flatten)]
    pub kind: RowLevelPolicyKind,
}

impl RowLevelPolicy {
    /// Create a predicate policy.
    pub fn predicate<F>(entity: impl Into<String>, action: RowLevelAction, predicate: F) -> Self
    where
        F: Fn(&EntityRecord, &UserDetails) -> bool + Send + Sync + 'static,
    {
        Self {
            entity: entity.into(),
            action,
            kind: RowLevelPolicyKind::Predicate(Arc::new(predicate)),
        }
    }

    /// Create a JPQL read policy.
    pub fn jpql(
        entity: impl Into<String>,
        join_clause: Option<&str>,
        where_clause: Option<&str>,
    ) -> Self {
        Self {
            entity: entity.into(),
            action: RowLevelAction::Read,
            kind: RowLevelPolicyKind::Jpql {
                join_clause: join_clause.map(str::to_string),
                where_clause: where_clause.map(str::to_string),
            },
        }
    }

    /// Predicate of this policy, if it is a predicate policy.
    pub fn as_predicate(&self) -> Option<&RowPredicate> {
        match &self.kind {
            RowLevelPolicyKind::Predicate(p) => Some(p),
            RowLevelPolicyKind::Jpql { .. } => None,
        }
    }

    /// Check if this is a JPQL policy.
    pub fn is_jpql(&self) -> bool {
        matches!(self.kind, RowLevelPolicyKind::Jpql { .. })
    }
}
