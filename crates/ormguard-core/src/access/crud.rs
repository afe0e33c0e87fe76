//! Entity CRUD constraint.

use super::{AccessConstraint, CrudEntityContext};
use crate::security::{PolicyStore, SecureOperations, SecurityResult};
use std::sync::Arc;
use tracing::debug;

/// Denies the CRUD actions the current user holds no entity policy for.
pub struct CrudEntityConstraint {
    store: Arc<dyn PolicyStore>,
}

impl CrudEntityConstraint {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }
}

impl AccessConstraint<CrudEntityContext> for CrudEntityConstraint {
    fn apply_to(&self, context: &mut CrudEntityContext) -> SecurityResult<()> {
        let store = &self.store.snapshot();
        let entity = Arc::clone(context.entity());

        if !SecureOperations::is_entity_create_permitted(&entity, store) {
            context.set_create_denied();
        }
        if !SecureOperations::is_entity_read_permitted(&entity, store) {
            context.set_read_denied();
        }
        if !SecureOperations::is_entity_update_permitted(&entity, store) {
            context.set_update_denied();
        }
        if !SecureOperations::is_entity_delete_permitted(&entity, store) {
            context.set_delete_denied();
        }

        debug!(
            entity = %entity.name,
            create = context.is_create_permitted(),
            read = context.is_read_permitted(),
            update = context.is_update_permitted(),
            delete = context.is_delete_permitted(),
            "entity crud constraint applied"
        );
        Ok(())
    }
}
