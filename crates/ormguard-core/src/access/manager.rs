//! Constraint registry.

use super::{
    AccessConstraint, AccessContext, CrudEntityConstraint, EntityAttributeConstraint,
    ExportImportEntityConstraint, GraphQlConstraint, InMemoryCrudEntityConstraint,
    LoadValuesConstraint, ReadEntityQueryConstraint, SpecificConstraint,
    SpecificOperationAccessContext,
};
use crate::security::{PolicyStore, PredefinedQueryParameters, SecurityResult};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

type Registered<C> = Arc<dyn AccessConstraint<C>>;

/// Registry of constraints keyed by access context type.
///
/// Constraints run in registration order. The first error stops the chain.
#[derive(Default)]
pub struct AccessManager {
    constraints: HashMap<TypeId, Vec<Box<dyn Any + Send + Sync>>>,
}

impl AccessManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager with the built-in constraint for every context kind.
    pub fn with_default_constraints(
        store: Arc<dyn PolicyStore>,
        parameters: PredefinedQueryParameters,
    ) -> Self {
        let mut manager = Self::new();
        manager
            .register(CrudEntityConstraint::new(store.clone()))
            .register(EntityAttributeConstraint::new(store.clone()))
            .register(ExportImportEntityConstraint::new(store.clone()))
            .register(LoadValuesConstraint::new(store.clone()))
            .register(InMemoryCrudEntityConstraint::new(store.clone()))
            .register(ReadEntityQueryConstraint::new(store.clone(), parameters))
            .register(SpecificConstraint::<SpecificOperationAccessContext>::from_context(
                store.clone(),
            ))
            .register(GraphQlConstraint::new(store));
        manager
    }

    /// Register a constraint for its context type.
    pub fn register<C, T>(&mut self, constraint: T) -> &mut Self
    where
        C: AccessContext,
        T: AccessConstraint<C> + 'static,
    {
        self.register_shared::<C>(Arc::new(constraint))
    }

    /// Register a shared constraint for context type `C`.
    pub fn register_shared<C: AccessContext>(&mut self, constraint: Registered<C>) -> &mut Self {
        trace!(context = std::any::type_name::<C>(), "constraint registered");
        self.constraints
            .entry(TypeId::of::<C>())
            .or_default()
            .push(Box::new(constraint));
        self
    }

    /// Number of constraints registered for context type `C`.
    pub fn constraint_count<C: AccessContext>(&self) -> usize {
        self.constraints
            .get(&TypeId::of::<C>())
            .map_or(0, Vec::len)
    }

    /// Run every constraint registered for the context's type.
    pub fn apply_registered_constraints<C: AccessContext>(&self, context: &mut C) -> SecurityResult<()> {
        let Some(registered) = self.constraints.get(&TypeId::of::<C>()) else {
            return Ok(());
        };
        for entry in registered {
            if let Some(constraint) = entry.downcast_ref::<Registered<C>>() {
                constraint.apply_to(context)?;
            }
        }
        Ok(())
    }

    /// Run the registered constraints, then `extra`.
    pub fn apply_constraints<C: AccessContext>(
        &self,
        context: &mut C,
        extra: &[Registered<C>],
    ) -> SecurityResult<()> {
        self.apply_registered_constraints(context)?;
        for constraint in extra {
            constraint.apply_to(context)?;
        }
        Ok(())
    }
}

impl fmt::Debug for AccessManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total: usize = self.constraints.values().map(Vec::len).sum();
        f.debug_struct("AccessManager")
            .field("context_types", &self.constraints.len())
            .field("constraints", &total)
            .finish()
    }
}
