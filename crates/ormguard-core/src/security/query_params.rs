//! Predefined query parameters for row-level JPQL policies.
//!
//! Where clauses may reference the current user through parameters such as
//! `:current_user_username` or `:current_user_id`. The parameter name is a
//! configurable prefix followed by one of the known suffixes.

use super::authentication::{CurrentAuthentication, UserDetails};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Default parameter prefix.
pub const DEFAULT_PREFIX: &str = "current_user_";

/// Value bound to a query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParamValue {
    /// Text value.
    Text(String),
    /// UUID value.
    Uuid(Uuid),
}

impl fmt::Display for QueryParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParamValue::Text(s) => write!(f, "'{}'", s),
            QueryParamValue::Uuid(u) => write!(f, "{}", u),
        }
    }
}

/// Resolves predefined parameter names against the current user.
#[derive(Clone)]
pub struct PredefinedQueryParameters {
    prefix: String,
    current: Arc<dyn CurrentAuthentication>,
}

impl PredefinedQueryParameters {
    /// Create a resolver with the default prefix.
    pub fn new(current: Arc<dyn CurrentAuthentication>) -> Self {
        Self::with_prefix(current, DEFAULT_PREFIX)
    }

    /// Create a resolver with a custom prefix.
    pub fn with_prefix(current: Arc<dyn CurrentAuthentication>, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            current,
        }
    }

    /// Configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Value of a parameter, or `None` if the name is not a predefined one
    /// or nobody is authenticated.
    pub fn parameter_value(&self, name: &str) -> Option<QueryParamValue> {
        let user = self.current.current_user()?;
        self.value_for(name, &user)
    }

    /// Value of a parameter for a given user.
    pub fn value_for(&self, name: &str, user: &UserDetails) -> Option<QueryParamValue> {
        resolve(&self.prefix, name, user)
    }
}

impl fmt::Debug for PredefinedQueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredefinedQueryParameters")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Resolve a parameter name for the given user.
pub fn resolve(prefix: &str, name: &str, user: &UserDetails) -> Option<QueryParamValue> {
    let suffix = name.strip_prefix(prefix)?;
    if suffix.eq_ignore_ascii_case("username") || suffix.eq_ignore_ascii_case("login") {
        Some(QueryParamValue::Text(user.username.clone()))
    } else if suffix.eq_ignore_ascii_case("id") {
        Uuid::parse_str(&user.key).ok().map(QueryParamValue::Uuid)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::authentication::{AuthenticationHolder, SecuredAuthentication};

    const ALICE_KEY: &str = "60885987-1b61-4247-94c7-dff348347f93";

    fn params(prefix: &str, key: &str) -> PredefinedQueryParameters {
        let holder = AuthenticationHolder::with(SecuredAuthentication::new(
            UserDetails::new("alice", key),
            Vec::new(),
            Vec::new(),
        ));
        PredefinedQueryParameters::with_prefix(Arc::new(holder), prefix)
    }

    #[test]
    fn test_default_tokens() {
        let params = params(DEFAULT_PREFIX, ALICE_KEY);

        assert_eq!(
            params.parameter_value("current_user_username"),
            Some(QueryParamValue::Text("alice".into()))
        );
        assert_eq!(
            params.parameter_value("current_user_id"),
            Some(QueryParamValue::Uuid(Uuid::parse_str(ALICE_KEY).unwrap()))
        );
        assert_eq!(params.parameter_value("current_user_email"), None);
        assert_eq!(params.parameter_value("tenant"), None);
    }

    #[test]
    fn test_custom_prefix() {
        let params = params("user", ALICE_KEY);
        assert_eq!(
            params.parameter_value("userLogin"),
            Some(QueryParamValue::Text("alice".into()))
        );
        assert!(params.parameter_value("current_user_username").is_none());
    }

    #[test]
    fn test_value_for_ignores_current_user() {
        let params = params(DEFAULT_PREFIX, ALICE_KEY);
        let bob = UserDetails::new("bob", "2");
        assert_eq!(
            params.value_for("current_user_login", &bob),
            Some(QueryParamValue::Text("bob".into()))
        );
        assert_eq!(params.value_for("current_user_id", &bob), None);
    }

    #[test]
    fn test_non_uuid_key() {
        let params = params(DEFAULT_PREFIX, "alice-key");
        assert_eq!(params.parameter_value("current_user_id"), None);
    }

    #[test]
    fn test_unauthenticated() {
        let params = PredefinedQueryParameters::new(Arc::new(AuthenticationHolder::new()));
        assert_eq!(params.parameter_value("current_user_username"), None);
    }
}
