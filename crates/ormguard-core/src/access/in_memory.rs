//! In-memory row-level constraint.

use super::{AccessConstraint, InMemoryCrudEntityContext, RecordPredicate};
use crate::security::{EntityRecord, PolicyStore, RowLevelAction, SecurityResult};
use std::sync::Arc;
use tracing::debug;

/// Adds the predicate row-level policies of the entity to the context,
/// bound to the user the policies belong to.
pub struct InMemoryCrudEntityConstraint {
    store: Arc<dyn PolicyStore>,
}

impl InMemoryCrudEntityConstraint {
    pub fn new(store: Arc<dyn PolicyStore>) -> Self {
        Self { store }
    }
}

impl AccessConstraint<InMemoryCrudEntityContext> for InMemoryCrudEntityConstraint {
    fn apply_to(&self, context: &mut InMemoryCrudEntityContext) -> SecurityResult<()> {
        let snapshot = self.store.snapshot();
        let Some(user) = snapshot.user() else {
            return Ok(());
        };

        let policies = snapshot.row_level_policies(&context.entity().name);
        let mut added = 0;
        for policy in &policies {
            let Some(predicate) = policy.as_predicate() else {
                continue;
            };
            let predicate = Arc::clone(predicate);
            let user = user.clone();
            let bound: RecordPredicate = Arc::new(move |record: &EntityRecord| predicate(record, &user));

            match policy.action {
                RowLevelAction::Create => context.add_create_predicate(bound),
                RowLevelAction::Read => context.add_read_predicate(bound),
                RowLevelAction::Update => context.add_update_predicate(bound),
                RowLevelAction::Delete => context.add_delete_predicate(bound),
            }
            added += 1;
        }

        if added > 0 {
            debug!(entity = %context.entity().name, predicates = added, "row-level predicates added");
        }
        Ok(())
    }
}
