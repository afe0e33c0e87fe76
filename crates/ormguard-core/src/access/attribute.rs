//! Entity attribute constraint.

use super::{AccessConstraint, EntityAttributeContext};
use crate::security::{PolicyStore, SecureOperations, SecurityResult};
use std::sync::Arc;
use tracing::debug;

/// Denies viewing or modifying an attribute path.
pub struct EntityAttributeConstraint {
    store: Arc<dyn PolicyStore>,
}

impl EntityAttributeConstraint {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }
}

impl AccessConstraint<EntityAttributeContext> for EntityAttributeConstraint {
    fn apply_to(&self, context: &mut EntityAttributeContext) -> SecurityResult<()> {
        let store = &self.store.snapshot();

        if !SecureOperations::is_entity_attr_update_permitted(context.property_path(), store) {
            debug!(path = %context.property_path(), "attribute modify denied");
            context.set_modify_denied();
        }
        if !SecureOperations::is_entity_attr_read_permitted(context.property_path(), store) {
            debug!(path = %context.property_path(), "attribute view denied");
            context.set_view_denied();
        }
        Ok(())
    }
}
