//! ORMGuard Core - Entity, attribute and row-level security for ORM data access.
//!
//! This crate decides what the current user may do with entities, their
//! attributes and named operations, and narrows read queries to the rows the
//! user may see.

pub mod access;
pub mod config;
pub mod error;
pub mod metadata;
pub mod security;

pub use access::{
    AccessConstraint, AccessContext, AccessManager, CrudEntityContext, EntityAttributeContext,
    ExportImportEntityContext, GraphQlOperationAccessContext, InMemoryCrudEntityContext,
    LoadValuesAccessContext, ReadEntityQueryContext, SpecificOperationAccessContext,
};
pub use config::{SecurityConfig, UserAssignment};
pub use error::{Error, Result};
pub use metadata::{MetaClass, MetaProperty, MetaPropertyPath, Metadata, PropertyRange};

// Security exports
pub use security::{
    AuthenticationHolder, AuthenticationPolicyStore, CurrentAuthentication, PolicyAction,
    PolicyEffect, PolicyStore, PredefinedQueryParameters, ResourcePolicy, ResourcePolicyType,
    RoleAuthenticator, RowLevelPolicy, SecureOperations, SecuredAuthentication, SecurityError,
    SecurityResult, UserDetails,
};
