//! Read query rewriting context.

use super::AccessContext;
use crate::metadata::MetaClass;
use crate::security::query_params::QueryParamValue;
use std::fmt;
use std::sync::Arc;

/// Placeholder for the entity alias in injected clauses.
pub const ENTITY_ALIAS_PLACEHOLDER: &str = "{E}";

/// Resolves query parameter names at execution time.
pub type QueryParamsProvider = Arc<dyn Fn(&str) -> Option<QueryParamValue> + Send + Sync>;

/// Collects join and where fragments to add to a read query of one entity.
#[derive(Clone)]
pub struct ReadEntityQueryContext {
    entity: Arc<MetaClass>,
    joins: Vec<String>,
    where_conditions: Vec<String>,
    query_params_provider: Option<QueryParamsProvider>,
}

/// Fragments with the entity alias substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedConditions {
    /// Join clauses in injection order.
    pub joins: Vec<String>,
    /// All where conditions AND-ed together, or `None` if there are none.
    pub where_clause: Option<String>,
}

impl ReadEntityQueryContext {
    /// Create a context for a read query of the entity.
    pub fn new(entity: Arc<MetaClass>) -> Self {
        Self {
            entity,
            joins: Vec::new(),
            where_conditions: Vec::new(),
            query_params_provider: None,
        }
    }

    pub fn entity(&self) -> &MetaClass {
        &self.entity
    }

    /// Add a join clause.
    pub fn add_join(&mut self, join: impl Into<String>) {
        self.joins.push(join.into());
    }

    /// Add a where condition.
    pub fn add_where(&mut self, condition: impl Into<String>) {
        self.where_conditions.push(condition.into());
    }

    pub fn joins(&self) -> &[String] {
        &self.joins
    }

    pub fn where_conditions(&self) -> &[String] {
        &self.where_conditions
    }

    /// Set the provider used to resolve parameters in injected clauses.
    pub fn set_query_params_provider(&mut self, provider: QueryParamsProvider) {
        self.query_params_provider = Some(provider);
    }

    pub fn has_query_params_provider(&self) -> bool {
        self.query_params_provider.is_some()
    }

    /// Resolve a parameter through the registered provider.
    pub fn query_param(&self, name: &str) -> Option<QueryParamValue> {
        self.query_params_provider.as_ref().and_then(|p| p(name))
    }

    /// Substitute `alias` for `{E}` and combine the where conditions.
    pub fn render(&self, alias: &str) -> RenderedConditions {
        let joins = self
            .joins
            .iter()
            .map(|j| j.replace(ENTITY_ALIAS_PLACEHOLDER, alias))
            .collect();

        let where_clause = match self.where_conditions.as_slice() {
            [] => None,
            [single] => Some(single.replace(ENTITY_ALIAS_PLACEHOLDER, alias)),
            many => Some(
                many.iter()
                    .map(|w| format!("({})", w.replace(ENTITY_ALIAS_PLACEHOLDER, alias)))
                    .collect::<Vec<_>>()
                    .join(" and "),
            ),
        };

        RenderedConditions {
            joins,
            where_clause,
        }
    }

    /// Names of the `:parameters` used by the injected clauses, in order of
    /// first appearance.
    pub fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for clause in self.joins.iter().chain(&self.where_conditions) {
            for name in scan_parameters(clause) {
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

/// Named parameters in a clause. Text inside single-quoted literals is
/// skipped; a doubled quote inside a literal toggles twice.
fn scan_parameters(clause: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let bytes = clause.as_bytes();
    let mut in_literal = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            in_literal = !in_literal;
            i += 1;
        } else if in_literal {
            i += 1;
        } else if bytes[i] == b':' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len()
                && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_' || bytes[end] == b'$')
            {
                end += 1;
            }
            let starts_with_letter = start < end
                && (bytes[start].is_ascii_alphabetic() || bytes[start] == b'_');
            if starts_with_letter {
                names.push(&clause[start..end]);
            }
            i = end.max(start);
        } else {
            i += 1;
        }
    }
    names
}

impl fmt::Debug for ReadEntityQueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadEntityQueryContext")
            .field("entity", &self.entity.name)
            .field("joins", &self.joins)
            .field("where_conditions", &self.where_conditions)
            .field("has_query_params_provider", &self.query_params_provider.is_some())
            .finish()
    }
}

impl AccessContext for ReadEntityQueryContext {}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ReadEntityQueryContext {
        ReadEntityQueryContext::new(Arc::new(MetaClass::new("Order")))
    }

    #[test]
    fn test_render_single_condition() {
        let mut ctx = context();
        ctx.add_join("join {E}.customer c");
        ctx.add_where("{E}.owner = :current_user_username");

        let rendered = ctx.render("o");
        assert_eq!(rendered.joins, vec!["join o.customer c".to_string()]);
        assert_eq!(
            rendered.where_clause.as_deref(),
            Some("o.owner = :current_user_username")
        );
    }

    #[test]
    fn test_render_combines_conditions() {
        let mut ctx = context();
        ctx.add_where("{E}.active = true");
        ctx.add_where("{E}.region = :region");

        assert_eq!(
            ctx.render("e").where_clause.as_deref(),
            Some("(e.active = true) and (e.region = :region)")
        );
        assert!(context().render("e").where_clause.is_none());
    }

    #[test]
    fn test_parameter_names() {
        let mut ctx = context();
        ctx.add_join("join {E}.team t on t.lead = :current_user_id");
        ctx.add_where("{E}.owner = :current_user_username or {E}.lead = :current_user_id");
        ctx.add_where("{E}.created > :since and {E}.note <> ':x'");
        ctx.add_where("{E}.label = 'it''s :y' and {E}.region = :region");

        assert_eq!(
            ctx.parameter_names(),
            vec!["current_user_id", "current_user_username", "since", "region"]
        );
    }

    #[test]
    fn test_query_param_without_provider() {
        let ctx = context();
        assert!(!ctx.has_query_params_provider());
        assert!(ctx.query_param("current_user_username").is_none());
    }
}
