//! Named operation constraints.

use super::{AccessConstraint, GraphQlOperationAccessContext, SpecificOperationContext};
use crate::security::{PolicyStore, SecureOperations, SecurityResult};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Gates a specific-operation context on a specific resource policy.
///
/// The resource is either fixed when the constraint is built, for context
/// types that stand for one operation, or taken from the context.
pub struct SpecificConstraint<C> {
    store: Arc<dyn PolicyStore>,
    resource: Option<String>,
    _context: PhantomData<fn(&mut C)>,
}

impl<C: SpecificOperationContext> SpecificConstraint<C> {
    /// Gate every context of type `C` on `resource`.
    pub fn new(store: Arc<dyn PolicyStore>, resource: impl Into<String>) -> Self {
        Self {
            store,
            resource: Some(resource.into()),
            _context: PhantomData,
        }
    }

    /// Gate each context on the resource name it carries.
    pub fn from_context(store: Arc<dyn PolicyStore>) -> Self {
        Self {
            store,
            resource: None,
            _context: PhantomData,
        }
    }
}

impl<C: SpecificOperationContext> AccessConstraint<C> for SpecificConstraint<C> {
    fn apply_to(&self, context: &mut C) -> SecurityResult<()> {
        let resource = match &self.resource {
            Some(resource) => resource.clone(),
            None => context.resource_name().to_string(),
        };
        if !SecureOperations::is_specific_permitted(&resource, self.store.as_ref()) {
            debug!(resource = %resource, "specific operation denied");
            context.set_denied();
        }
        Ok(())
    }
}

/// Gates GraphQL operations on GraphQL resource policies.
pub struct GraphQlConstraint {
    store: Arc<dyn PolicyStore>,
}

impl GraphQlConstraint {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }
}

impl AccessConstraint<GraphQlOperationAccessContext> for GraphQlConstraint {
    fn apply_to(&self, context: &mut GraphQlOperationAccessContext) -> SecurityResult<()> {
        if !SecureOperations::is_graphql_permitted(context.operation(), self.store.as_ref()) {
            debug!(operation = %context.operation(), "graphql operation denied");
            context.set_denied();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::test_support::store;
    use crate::access::{AccessContext, SpecificOperationAccessContext};
    use crate::security::{PolicyEffect, ResourcePolicy};

    #[derive(Default)]
    struct ReportRunContext {
        denied: bool,
    }

    impl AccessContext for ReportRunContext {}

    impl SpecificOperationContext for ReportRunContext {
        fn resource_name(&self) -> &str {
            "reports.run"
        }

        fn set_denied(&mut self) {
            self.denied = true;
        }

        fn is_permitted(&self) -> bool {
            !self.denied
        }
    }

    #[test]
    fn test_resource_from_context() {
        let constraint = SpecificConstraint::<SpecificOperationAccessContext>::from_context(store(
            vec![ResourcePolicy::specific("reports.run")],
        ));

        let mut allowed = SpecificOperationAccessContext::new("reports.run");
        constraint.apply_to(&mut allowed).unwrap();
        assert!(allowed.is_permitted());

        let mut denied = SpecificOperationAccessContext::new("reports.delete");
        constraint.apply_to(&mut denied).unwrap();
        assert!(!denied.is_permitted());
    }

    #[test]
    fn test_fixed_resource() {
        let constraint =
            SpecificConstraint::<ReportRunContext>::new(store(Vec::new()), "reports.run");
        let mut ctx = ReportRunContext::default();
        constraint.apply_to(&mut ctx).unwrap();
        assert!(!ctx.is_permitted());

        let constraint = SpecificConstraint::<ReportRunContext>::new(
            store(vec![ResourcePolicy::specific("*")]),
            "reports.run",
        );
        let mut ctx = ReportRunContext::default();
        constraint.apply_to(&mut ctx).unwrap();
        assert!(ctx.is_permitted());
    }

    #[test]
    fn test_graphql() {
        let constraint = GraphQlConstraint::new(store(vec![
            ResourcePolicy::graphql("orderList"),
            ResourcePolicy::graphql("orderDelete").with_effect(PolicyEffect::Deny),
        ]));

        let mut list = GraphQlOperationAccessContext::new("orderList");
        constraint.apply_to(&mut list).unwrap();
        assert!(list.is_permitted());

        let mut delete = GraphQlOperationAccessContext::new("orderDelete");
        constraint.apply_to(&mut delete).unwrap();
        assert!(!delete.is_permitted());
    }
}
