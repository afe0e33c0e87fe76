//! Read query rewriting constraint.

use super::{AccessConstraint, QueryParamsProvider, ReadEntityQueryContext};
use crate::security::{
    PolicyStore, PredefinedQueryParameters, RowLevelAction, RowLevelPolicyKind, SecurityResult,
};
use std::sync::Arc;
use tracing::debug;

/// Injects the JPQL read policies of the entity into the query and
/// registers the predefined parameter resolver.
///
/// The resolver is bound to the user whose policies were injected, not to
/// whoever is logged in when the query runs.
pub struct ReadEntityQueryConstraint {
    store: Arc<dyn PolicyStore>,
    parameters: PredefinedQueryParameters,
}

impl ReadEntityQueryConstraint {
    pub fn new(store: Arc<dyn PolicyStore>, parameters: PredefinedQueryParameters) -> Self {
        Self { store, parameters }
    }
}

fn non_blank(clause: &Option<String>) -> Option<&str> {
    clause.as_deref().map(str::trim).filter(|c| !c.is_empty())
}

impl AccessConstraint<ReadEntityQueryContext> for ReadEntityQueryConstraint {
    fn apply_to(&self, context: &mut ReadEntityQueryContext) -> SecurityResult<()> {
        let snapshot = self.store.snapshot();
        let policies = snapshot.row_level_policies(&context.entity().name);

        for policy in &policies {
            if policy.action != RowLevelAction::Read {
                continue;
            }
            if let RowLevelPolicyKind::Jpql {
                join_clause,
                where_clause,
            } = &policy.kind
            {
                if let Some(join) = non_blank(join_clause) {
                    context.add_join(join);
                }
                if let Some(condition) = non_blank(where_clause) {
                    context.add_where(condition);
                }
            }
        }

        let parameters = self.parameters.clone();
        let user = snapshot.user().cloned();
        let provider: QueryParamsProvider = Arc::new(move |name: &str| {
            user.as_ref().and_then(|user| parameters.value_for(name, user))
        });
        context.set_query_params_provider(provider);

        debug!(
            entity = %context.entity().name,
            joins = context.joins().len(),
            conditions = context.where_conditions().len(),
            "read query constraint applied"
        );
        Ok(())
    }
}
