//! Command execution.

use crate::error::{CliError, CliResult};
use crate::formatter::Report;
use ormguard_core::access::{
    AccessManager, CrudEntityContext, EntityAttributeContext, ExportImportEntityContext,
    ReadEntityQueryContext, SpecificOperationAccessContext, SpecificOperationContext,
};
use ormguard_core::security::{
    AuthenticationHolder, AuthenticationPolicyStore, PredefinedQueryParameters,
    RoleAuthenticator, SecuredAuthentication, SledRoleStore,
};
use ormguard_core::{Metadata, SecurityConfig};
use std::sync::Arc;
use tracing::info;

fn permission(permitted: bool) -> &'static str {
    if permitted {
        "permitted"
    } else {
        "denied"
    }
}

/// An authenticated user with the default constraints.
pub struct Session {
    metadata: Metadata,
    authentication: Arc<SecuredAuthentication>,
    manager: AccessManager,
}

impl Session {
    /// Authenticate `username` from the configuration.
    ///
    /// Roles in the sled store take precedence over roles declared in the
    /// configuration.
    pub fn open(
        config: &SecurityConfig,
        store: Option<&sled::Db>,
        username: &str,
    ) -> CliResult<Self> {
        let mut authenticator = RoleAuthenticator::new();
        if let Some(db) = store {
            authenticator = authenticator.with_repository(Arc::new(SledRoleStore::open(db)?));
        }
        let authenticator = authenticator.with_repository(Arc::new(config.role_repository()?));

        let holder = Arc::new(AuthenticationHolder::new());
        let authentication = holder.set(config.authenticate(&authenticator, username)?);
        let policy_store = Arc::new(AuthenticationPolicyStore::new(holder.clone()));
        let parameters =
            PredefinedQueryParameters::with_prefix(holder, &config.query_parameter_prefix);

        Ok(Self {
            metadata: config.metadata(),
            authentication,
            manager: AccessManager::with_default_constraints(policy_store, parameters),
        })
    }

    fn title(&self, subject: &str) -> String {
        format!("{} @ {}", subject, self.authentication.user().username)
    }

    /// CRUD permissions of an entity.
    pub fn entity(&self, entity: &str) -> CliResult<Report> {
        let mut context = CrudEntityContext::new(self.metadata.class(entity)?);
        self.manager.apply_registered_constraints(&mut context)?;

        Ok(Report::new(self.title(entity))
            .row("create", permission(context.is_create_permitted()))
            .row("read", permission(context.is_read_permitted()))
            .row("update", permission(context.is_update_permitted()))
            .row("delete", permission(context.is_delete_permitted())))
    }

    /// View and modify permissions of an attribute path.
    pub fn attribute(&self, entity: &str, path: &str) -> CliResult<Report> {
        let class = self.metadata.class(entity)?;
        let property_path = self.metadata.property_path(&class, path)?;
        let mut context = EntityAttributeContext::new(property_path);
        self.manager.apply_registered_constraints(&mut context)?;

        Ok(Report::new(self.title(&context.property_path().to_string()))
            .row("view", permission(context.can_view()))
            .row("modify", permission(context.can_modify())))
    }

    /// Permission of a named operation.
    pub fn specific(&self, resource: &str) -> CliResult<Report> {
        let mut context = SpecificOperationAccessContext::new(resource);
        self.manager.apply_registered_constraints(&mut context)?;

        Ok(Report::new(self.title(resource)).row("invoke", permission(context.is_permitted())))
    }

    /// Join and where fragments added to a read query, with parameter values.
    pub fn query(&self, entity: &str, alias: &str) -> CliResult<Report> {
        let mut context = ReadEntityQueryContext::new(self.metadata.class(entity)?);
        self.manager.apply_registered_constraints(&mut context)?;

        let rendered = context.render(alias);
        let mut report = Report::new(self.title(&format!("select {} from {} {}", alias, entity, alias)));
        for join in &rendered.joins {
            report = report.row("join", join.clone());
        }
        report = report.row(
            "where",
            rendered.where_clause.unwrap_or_else(|| "<none>".to_string()),
        );
        for name in context.parameter_names() {
            let value = context
                .query_param(&name)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<unresolved>".to_string());
            report = report.row(format!(":{}", name), value);
        }
        Ok(report)
    }

    /// Attributes excluded from export and import.
    pub fn export(&self, entity: &str) -> CliResult<Report> {
        let mut context = ExportImportEntityContext::new(self.metadata.class(entity)?);
        self.manager.apply_registered_constraints(&mut context)?;

        let sorted = |names: &std::collections::HashSet<String>| {
            let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
            names.sort_unstable();
            names.join(", ")
        };
        Ok(Report::new(self.title(entity))
            .row("not exported", sorted(context.not_exported_attributes()))
            .row("not imported", sorted(context.not_imported_attributes())))
    }

    /// Effective role codes of the user.
    pub fn roles(&self) -> Report {
        self.authentication
            .role_codes()
            .iter()
            .fold(Report::new(self.title("roles")), |report, code| {
                report.row("role", code.clone())
            })
    }
}

/// Write the roles declared in the configuration into the sled store.
pub fn import(config: &SecurityConfig, db: &sled::Db) -> CliResult<Report> {
    let store = SledRoleStore::open(db)?;
    for role in &config.resource_roles {
        store.put_resource_role(role)?;
    }
    for role in &config.row_level_roles {
        store.put_row_level_role(role)?;
    }
    store.flush()?;

    info!(
        resource_roles = config.resource_roles.len(),
        row_level_roles = config.row_level_roles.len(),
        "roles imported"
    );
    Ok(Report::new("import")
        .row("resource roles", config.resource_roles.len().to_string())
        .row("row-level roles", config.row_level_roles.len().to_string()))
}

/// Require a user for commands that evaluate permissions.
pub fn require_user(user: Option<&str>) -> CliResult<&str> {
    user.ok_or_else(|| CliError::Usage("--user is required for this command".to_string()))
}
