//! Scalar query constraint.

use super::{AccessConstraint, LoadValuesAccessContext};
use crate::security::{PermissionType, PolicyStore, SecureOperations, SecurityError, SecurityResult};
use std::sync::Arc;
use tracing::debug;

/// Checks a scalar query against entity and attribute read permissions.
///
/// An unreadable entity class denies the whole query. An unreadable path
/// anywhere in the query is an error. An unreadable selected path only
/// masks its result columns.
pub struct LoadValuesConstraint {
    store: Arc<dyn PolicyStore>,
}

impl LoadValuesConstraint {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }
}

impl AccessConstraint<LoadValuesAccessContext> for LoadValuesConstraint {
    fn apply_to(&self, context: &mut LoadValuesAccessContext) -> SecurityResult<()> {
        let store = &self.store.snapshot();

        let denied_class = context
            .entity_classes()
            .iter()
            .find(|class| !SecureOperations::is_entity_read_permitted(class, store))
            .map(|class| class.name.clone());
        if let Some(entity) = denied_class {
            debug!(entity = %entity, "load values denied");
            context.set_denied();
            return Ok(());
        }

        for path in context.all_property_paths() {
            if !SecureOperations::is_entity_attr_read_permitted(path, store) {
                return Err(SecurityError::access_denied(
                    PermissionType::EntityAttribute,
                    path.to_string(),
                ));
            }
        }

        let masked: Vec<usize> = context
            .selected_property_paths()
            .iter()
            .filter(|(_, path)| !SecureOperations::is_entity_attr_read_permitted(path, store))
            .map(|(index, _)| *index)
            .collect();
        for index in masked {
            debug!(column = index, "load values column masked");
            context.add_denied_selected_index(index);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::test_support::store;
    use crate::metadata::{MetaClass, Metadata};
    use crate::security::{PolicyAction, ResourcePolicy};

    fn metadata() -> Metadata {
        Metadata::new()
            .with_class(
                MetaClass::new("Order")
                    .with_datatype("number", "string")
                    .with_datatype("total", "decimal"),
            )
            .with_class(MetaClass::new("Invoice").with_datatype("amount", "decimal"))
    }

    fn policies() -> Vec<ResourcePolicy> {
        vec![
            ResourcePolicy::entity("Order", PolicyAction::Read),
            ResourcePolicy::entity_attribute("Order", "number", PolicyAction::Read),
        ]
    }

    #[test]
    fn test_any_denied_class_denies_context() {
        let metadata = metadata();
        let constraint = LoadValuesConstraint::new(store(policies()));
        let mut ctx = LoadValuesAccessContext::new()
            .with_entity_class(metadata.class("Order").unwrap())
            .with_entity_class(metadata.class("Invoice").unwrap());

        constraint.apply_to(&mut ctx).unwrap();
        assert!(!ctx.is_permitted());
    }

    #[test]
    fn test_unreadable_path_is_error() {
        let metadata = metadata();
        let order = metadata.class("Order").unwrap();
        let constraint = LoadValuesConstraint::new(store(policies()));
        let mut ctx = LoadValuesAccessContext::new()
            .with_entity_class(order.clone())
            .with_property_path(metadata.property_path(&order, "number").unwrap())
            .with_property_path(metadata.property_path(&order, "total").unwrap());

        let err = constraint.apply_to(&mut ctx).unwrap_err();
        match err {
            SecurityError::AccessDenied { permission, target } => {
                assert_eq!(permission, PermissionType::EntityAttribute);
                assert_eq!(target, "Order.total");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unreadable_selected_path_masks_column() {
        let metadata = metadata();
        let order = metadata.class("Order").unwrap();
        let constraint = LoadValuesConstraint::new(store(policies()));
        let mut ctx = LoadValuesAccessContext::new()
            .with_entity_class(order.clone())
            .with_property_path(metadata.property_path(&order, "number").unwrap())
            .with_selected_property_path(0, metadata.property_path(&order, "number").unwrap())
            .with_selected_property_path(1, metadata.property_path(&order, "total").unwrap())
            .with_selected_property_path(3, metadata.property_path(&order, "total").unwrap());

        constraint.apply_to(&mut ctx).unwrap();
        assert!(ctx.is_permitted());
        assert_eq!(ctx.denied_selected_indexes().iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    }
}
