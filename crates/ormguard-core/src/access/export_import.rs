//! Export and import attribute filtering.

use super::{AccessConstraint, ExportImportEntityContext};
use crate::metadata::MetaPropertyPath;
use crate::security::{PolicyStore, SecureOperations, SecurityResult};
use std::sync::Arc;
use tracing::debug;

/// Excludes attributes the user cannot read from export, and attributes the
/// user cannot update from import.
pub struct ExportImportEntityConstraint {
    store: Arc<dyn PolicyStore>,
}

impl ExportImportEntityConstraint {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }
}

impl AccessConstraint<ExportImportEntityContext> for ExportImportEntityConstraint {
    fn apply_to(&self, context: &mut ExportImportEntityContext) -> SecurityResult<()> {
        let store = &self.store.snapshot();
        let properties = context.entity().properties.clone();

        for property in properties {
            let name = property.name.clone();
            let path = MetaPropertyPath::single(property);

            if !SecureOperations::is_entity_attr_read_permitted(&path, store) {
                context.add_not_exported_attribute(name.clone());
            }
            if !SecureOperations::is_entity_attr_update_permitted(&path, store) {
                context.add_not_imported_attribute(name);
            }
        }

        debug!(
            entity = %context.entity().name,
            not_exported = context.not_exported_attributes().len(),
            not_imported = context.not_imported_attributes().len(),
            "export/import constraint applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::test_support::store;
    use crate::metadata::MetaClass;
    use crate::security::{PolicyAction, ResourcePolicy};

    fn order() -> Arc<MetaClass> {
        Arc::new(
            MetaClass::new("Order")
                .with_datatype("number", "string")
                .with_datatype("total", "decimal")
                .with_datatype("note", "string")
                .with_reference("customer", "Customer"),
        )
    }

    #[test]
    fn test_k_failing_of_n() {
        let constraint = ExportImportEntityConstraint::new(store(vec![
            ResourcePolicy::entity_attribute("Order", "number", PolicyAction::Update),
            ResourcePolicy::entity_attribute("Order", "total", PolicyAction::Read),
        ]));
        let mut ctx = ExportImportEntityContext::new(order());
        constraint.apply_to(&mut ctx).unwrap();

        assert_eq!(ctx.not_exported_attributes().len(), 2);
        assert!(!ctx.can_exported("note"));
        assert!(!ctx.can_exported("customer"));
        assert!(ctx.can_exported("number"));
        assert!(ctx.can_exported("total"));

        assert_eq!(ctx.not_imported_attributes().len(), 3);
        assert!(ctx.can_imported("number"));
        assert!(!ctx.can_imported("total"));
    }

    #[test]
    fn test_reapply_is_stable() {
        let constraint = ExportImportEntityConstraint::new(store(Vec::new()));

        let mut first = ExportImportEntityContext::new(order());
        constraint.apply_to(&mut first).unwrap();
        let mut second = ExportImportEntityContext::new(order());
        constraint.apply_to(&mut second).unwrap();

        assert_eq!(first.not_exported_attributes(), second.not_exported_attributes());
        assert_eq!(first.not_exported_attributes().len(), 4);
    }
}
