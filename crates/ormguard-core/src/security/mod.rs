//! Security policies and permission decisions.
//!
//! This module provides:
//! - Resource policies for entities, attributes and named operations
//! - Row-level policies (in-memory predicates and JPQL fragments)
//! - Per-authentication policy indexes, built lazily
//! - Pure permission decisions over a [`PolicyStore`]
//! - Roles, role persistence and role-based authentication
//!
//! # Example
//!
//! ```ignore
//! use ormguard_core::security::*;
//! use std::sync::Arc;
//!
//! let holder = Arc::new(AuthenticationHolder::new());
//! holder.set(SecuredAuthentication::new(
//!     UserDetails::new("alice", "60885987-1b61-4247-94c7-dff348347f93"),
//!     vec![ResourcePolicy::entity("Order", PolicyAction::Read)],
//!     Vec::new(),
//! ));
//!
//! let store = AuthenticationPolicyStore::new(holder);
//! assert!(SecureOperations::is_entity_permitted("Order", PolicyAction::Read, &store));
//! ```

pub mod authentication;
pub mod error;
pub mod index;
pub mod policy;
pub mod query_params;
pub mod role_store;
pub mod roles;
pub mod row_level;
pub mod secure_ops;
pub mod store;

// Error types
pub use error::{PermissionType, SecurityError, SecurityResult};

// Authentication
pub use authentication::{
    AuthenticationHolder, CurrentAuthentication, SecuredAuthentication, UserDetails,
};

// Policies
pub use policy::{PolicyAction, PolicyEffect, ResourcePolicy, ResourcePolicyType, WILDCARD};
pub use row_level::{EntityRecord, RowLevelAction, RowLevelPolicy, RowLevelPolicyKind, RowPredicate};

// Indexes and lookups
pub use index::{PolicyIndex, PolicyIndexes};
pub use store::{AuthenticationPolicyStore, PolicySnapshot, PolicyStore};

// Decisions
pub use secure_ops::SecureOperations;
pub use query_params::{PredefinedQueryParameters, QueryParamValue};

// Roles
pub use role_store::SledRoleStore;
pub use roles::{InMemoryRoleRepository, ResourceRole, RoleAuthenticator, RoleRepository, RowLevelRole};
