//! Access contexts and the constraints that decide them.
//!
//! The data layer describes an attempted operation with an access context,
//! runs it through the constraints registered in an [`AccessManager`], and
//! reads the outcome back from the context. Each context kind has exactly
//! one built-in constraint:
//!
//! | Context | Constraint |
//! |---|---|
//! | [`CrudEntityContext`] | [`CrudEntityConstraint`] |
//! | [`EntityAttributeContext`] | [`EntityAttributeConstraint`] |
//! | [`ExportImportEntityContext`] | [`ExportImportEntityConstraint`] |
//! | [`LoadValuesAccessContext`] | [`LoadValuesConstraint`] |
//! | [`InMemoryCrudEntityContext`] | [`InMemoryCrudEntityConstraint`] |
//! | [`ReadEntityQueryContext`] | [`ReadEntityQueryConstraint`] |
//! | [`SpecificOperationAccessContext`] | [`SpecificConstraint`] |
//! | [`GraphQlOperationAccessContext`] | [`GraphQlConstraint`] |

pub mod attribute;
pub mod context;
pub mod crud;
pub mod export_import;
pub mod in_memory;
pub mod load_values;
pub mod manager;
pub mod query_context;
pub mod read_query;
pub mod specific;

use crate::security::SecurityResult;

pub use attribute::EntityAttributeConstraint;
pub use context::{
    CrudEntityContext, EntityAttributeContext, ExportImportEntityContext,
    GraphQlOperationAccessContext, InMemoryCrudEntityContext, LoadValuesAccessContext,
    RecordPredicate, SpecificOperationAccessContext, SpecificOperationContext,
};
pub use crud::CrudEntityConstraint;
pub use export_import::ExportImportEntityConstraint;
pub use in_memory::InMemoryCrudEntityConstraint;
pub use load_values::LoadValuesConstraint;
pub use manager::AccessManager;
pub use query_context::{
    QueryParamsProvider, ReadEntityQueryContext, RenderedConditions, ENTITY_ALIAS_PLACEHOLDER,
};
pub use read_query::ReadEntityQueryConstraint;
pub use specific::{GraphQlConstraint, SpecificConstraint};

/// Marker for request-scoped access contexts.
pub trait AccessContext: Send + 'static {}

/// Applies a permission decision to one kind of access context.
///
/// Constraints only mutate the context they are given, so applying one to a
/// fresh context twice yields identical results.
pub trait AccessConstraint<C: AccessContext>: Send + Sync {
    /// Apply the constraint, narrowing or denying the context.
    fn apply_to(&self, context: &mut C) -> SecurityResult<()>;
}
