//! Access contexts.
//!
//! A context describes one attempted operation and collects the decision.
//! Callers create a fresh context per check, pass it through the registered
//! constraints, then read the flags and sets back.

use super::AccessContext;
use crate::metadata::{MetaClass, MetaPropertyPath};
use crate::security::row_level::EntityRecord;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// CRUD permissions for one entity.
#[derive(Debug, Clone)]
pub struct CrudEntityContext {
    entity: Arc<MetaClass>,
    create_denied: bool,
    read_denied: bool,
    update_denied: bool,
    delete_denied: bool,
}

impl CrudEntityContext {
    /// Create a context for the entity; everything is permitted until denied.
    pub fn new(entity: Arc<MetaClass>) -> Self {
        Self {
            entity,
            create_denied: false,
            read_denied: false,
            update_denied: false,
            delete_denied: false,
        }
    }

    /// Entity being checked.
    pub fn entity(&self) -> &Arc<MetaClass> {
        &self.entity
    }

    pub fn set_create_denied(&mut self) {
        self.create_denied = true;
    }

    pub fn set_read_denied(&mut self) {
        self.read_denied = true;
    }

    pub fn set_update_denied(&mut self) {
        self.update_denied = true;
    }

    pub fn set_delete_denied(&mut self) {
        self.delete_denied = true;
    }

    pub fn is_create_permitted(&self) -> bool {
        !self.create_denied
    }

    pub fn is_read_permitted(&self) -> bool {
        !self.read_denied
    }

    pub fn is_update_permitted(&self) -> bool {
        !self.update_denied
    }

    pub fn is_delete_permitted(&self) -> bool {
        !self.delete_denied
    }
}

impl AccessContext for CrudEntityContext {}

/// View and modify permissions for one attribute path.
#[derive(Debug, Clone)]
pub struct EntityAttributeContext {
    property_path: MetaPropertyPath,
    view_denied: bool,
    modify_denied: bool,
}

impl EntityAttributeContext {
    /// Create a context for the attribute path.
    pub fn new(property_path: MetaPropertyPath) -> Self {
        Self {
            property_path,
            view_denied: false,
            modify_denied: false,
        }
    }

    /// Attribute path being checked.
    pub fn property_path(&self) -> &MetaPropertyPath {
        &self.property_path
    }

    pub fn set_view_denied(&mut self) {
        self.view_denied = true;
    }

    pub fn set_modify_denied(&mut self) {
        self.modify_denied = true;
    }

    pub fn can_view(&self) -> bool {
        !self.view_denied
    }

    pub fn can_modify(&self) -> bool {
        !self.modify_denied
    }
}

impl AccessContext for EntityAttributeContext {}

/// Attribute filtering for entity export and import.
///
/// Denials are collected per attribute; the export or import itself is never
/// refused.
#[derive(Debug, Clone)]
pub struct ExportImportEntityContext {
    entity: Arc<MetaClass>,
    not_exported: HashSet<String>,
    not_imported: HashSet<String>,
}

impl ExportImportEntityContext {
    /// Create a context for the entity.
    pub fn new(entity: Arc<MetaClass>) -> Self {
        Self {
            entity,
            not_exported: HashSet::new(),
            not_imported: HashSet::new(),
        }
    }

    /// Entity being exported or imported.
    pub fn entity(&self) -> &MetaClass {
        &self.entity
    }

    /// Exclude an attribute from export.
    pub fn add_not_exported_attribute(&mut self, name: impl Into<String>) {
        self.not_exported.insert(name.into());
    }

    /// Exclude an attribute from import.
    pub fn add_not_imported_attribute(&mut self, name: impl Into<String>) {
        self.not_imported.insert(name.into());
    }

    /// Attributes excluded from export.
    pub fn not_exported_attributes(&self) -> &HashSet<String> {
        &self.not_exported
    }

    /// Attributes excluded from import.
    pub fn not_imported_attributes(&self) -> &HashSet<String> {
        &self.not_imported
    }

    pub fn can_exported(&self, name: &str) -> bool {
        !self.not_exported.contains(name)
    }

    pub fn can_imported(&self, name: &str) -> bool {
        !self.not_imported.contains(name)
    }
}

impl AccessContext for ExportImportEntityContext {}

/// Permissions for a scalar ("load values") query.
///
/// The query touches a set of entity classes, reads a set of attribute
/// paths, and returns some of those paths as numbered result columns.
#[derive(Debug, Clone, Default)]
pub struct LoadValuesAccessContext {
    entity_classes: Vec<Arc<MetaClass>>,
    all_property_paths: Vec<MetaPropertyPath>,
    selected_property_paths: Vec<(usize, MetaPropertyPath)>,
    denied_selected_indexes: BTreeSet<usize>,
    denied: bool,
}

impl LoadValuesAccessContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity class referenced by the query.
    pub fn with_entity_class(mut self, class: Arc<MetaClass>) -> Self {
        self.entity_classes.push(class);
        self
    }

    /// Add an attribute path read anywhere in the query.
    pub fn with_property_path(mut self, path: MetaPropertyPath) -> Self {
        self.all_property_paths.push(path);
        self
    }

    /// Add an attribute path returned as result column `index`.
    pub fn with_selected_property_path(mut self, index: usize, path: MetaPropertyPath) -> Self {
        self.selected_property_paths.push((index, path));
        self
    }

    pub fn entity_classes(&self) -> &[Arc<MetaClass>] {
        &self.entity_classes
    }

    pub fn all_property_paths(&self) -> &[MetaPropertyPath] {
        &self.all_property_paths
    }

    /// Selected paths with their result column index.
    pub fn selected_property_paths(&self) -> &[(usize, MetaPropertyPath)] {
        &self.selected_property_paths
    }

    /// Deny the whole query.
    pub fn set_denied(&mut self) {
        self.denied = true;
    }

    /// Mask a result column.
    pub fn add_denied_selected_index(&mut self, index: usize) {
        self.denied_selected_indexes.insert(index);
    }

    pub fn is_permitted(&self) -> bool {
        !self.denied
    }

    /// Result columns that must be masked.
    pub fn denied_selected_indexes(&self) -> &BTreeSet<usize> {
        &self.denied_selected_indexes
    }
}

impl AccessContext for LoadValuesAccessContext {}

/// Predicate over a loaded record.
pub type RecordPredicate = Arc<dyn Fn(&EntityRecord) -> bool + Send + Sync>;

/// In-memory row-level checks for one entity.
///
/// Predicates accumulate per action; a record passes an action only if every
/// predicate registered for that action accepts it.
#[derive(Clone)]
pub struct InMemoryCrudEntityContext {
    entity: Arc<MetaClass>,
    create_predicates: Vec<RecordPredicate>,
    read_predicates: Vec<RecordPredicate>,
    update_predicates: Vec<RecordPredicate>,
    delete_predicates: Vec<RecordPredicate>,
}

impl InMemoryCrudEntityContext {
    /// Create a context for the entity.
    pub fn new(entity: Arc<MetaClass>) -> Self {
        Self {
            entity,
            create_predicates: Vec::new(),
            read_predicates: Vec::new(),
            update_predicates: Vec::new(),
            delete_predicates: Vec::new(),
        }
    }

    pub fn entity(&self) -> &MetaClass {
        &self.entity
    }

    pub fn add_create_predicate(&mut self, predicate: RecordPredicate) {
        self.create_predicates.push(predicate);
    }

    pub fn add_read_predicate(&mut self, predicate: RecordPredicate) {
        self.read_predicates.push(predicate);
    }

    pub fn add_update_predicate(&mut self, predicate: RecordPredicate) {
        self.update_predicates.push(predicate);
    }

    pub fn add_delete_predicate(&mut self, predicate: RecordPredicate) {
        self.delete_predicates.push(predicate);
    }

    pub fn create_predicates(&self) -> &[RecordPredicate] {
        &self.create_predicates
    }

    pub fn read_predicates(&self) -> &[RecordPredicate] {
        &self.read_predicates
    }

    pub fn update_predicates(&self) -> &[RecordPredicate] {
        &self.update_predicates
    }

    pub fn delete_predicates(&self) -> &[RecordPredicate] {
        &self.delete_predicates
    }

    pub fn is_create_permitted(&self, record: &EntityRecord) -> bool {
        self.create_predicates.iter().all(|p| p(record))
    }

    pub fn is_read_permitted(&self, record: &EntityRecord) -> bool {
        self.read_predicates.iter().all(|p| p(record))
    }

    pub fn is_update_permitted(&self, record: &EntityRecord) -> bool {
        self.update_predicates.iter().all(|p| p(record))
    }

    pub fn is_delete_permitted(&self, record: &EntityRecord) -> bool {
        self.delete_predicates.iter().all(|p| p(record))
    }
}

impl fmt::Debug for InMemoryCrudEntityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCrudEntityContext")
            .field("entity", &self.entity.name)
            .field("create_predicates", &self.create_predicates.len())
            .field("read_predicates", &self.read_predicates.len())
            .field("update_predicates", &self.update_predicates.len())
            .field("delete_predicates", &self.delete_predicates.len())
            .finish()
    }
}

impl AccessContext for InMemoryCrudEntityContext {}

/// A context gated by a single named-operation permission.
pub trait SpecificOperationContext: AccessContext {
    /// Resource name carried by the context itself.
    fn resource_name(&self) -> &str;

    /// Deny the operation.
    fn set_denied(&mut self);

    /// Check if the operation is still permitted.
    fn is_permitted(&self) -> bool;
}

/// Generic named-operation context.
#[derive(Debug, Clone)]
pub struct SpecificOperationAccessContext {
    name: String,
    denied: bool,
}

impl SpecificOperationAccessContext {
    /// Create a context for the named operation.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            denied: false,
        }
    }
}

impl AccessContext for SpecificOperationAccessContext {}

impl SpecificOperationContext for SpecificOperationAccessContext {
    fn resource_name(&self) -> &str {
        &self.name
    }

    fn set_denied(&mut self) {
        self.denied = true;
    }

    fn is_permitted(&self) -> bool {
        !self.denied
    }
}

/// GraphQL operation context.
#[derive(Debug, Clone)]
pub struct GraphQlOperationAccessContext {
    operation: String,
    denied: bool,
}

impl GraphQlOperationAccessContext {
    /// Create a context for the GraphQL operation.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            denied: false,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn set_denied(&mut self) {
        self.denied = true;
    }

    pub fn is_permitted(&self) -> bool {
        !self.denied
    }
}

impl AccessContext for GraphQlOperationAccessContext {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crud_flags_independent() {
        let mut ctx = CrudEntityContext::new(Arc::new(MetaClass::new("Order")));
        assert!(ctx.is_create_permitted() && ctx.is_read_permitted());

        ctx.set_create_denied();
        ctx.set_delete_denied();

        assert!(!ctx.is_create_permitted());
        assert!(ctx.is_read_permitted());
        assert!(ctx.is_update_permitted());
        assert!(!ctx.is_delete_permitted());
    }

    #[test]
    fn test_in_memory_predicates_all_must_pass() {
        let mut ctx = InMemoryCrudEntityContext::new(Arc::new(MetaClass::new("Order")));
        let record = EntityRecord::new("Order")
            .with("owner", "alice")
            .with("status", "open");

        assert!(ctx.is_read_permitted(&record));

        ctx.add_read_predicate(Arc::new(|r: &EntityRecord| r.get_str("owner") == Some("alice")));
        assert!(ctx.is_read_permitted(&record));

        ctx.add_read_predicate(Arc::new(|r: &EntityRecord| r.get_str("status") == Some("closed")));
        assert!(!ctx.is_read_permitted(&record));
        assert!(ctx.is_update_permitted(&record));
    }

    #[test]
    fn test_specific_context() {
        let mut ctx = SpecificOperationAccessContext::new("reports.run");
        assert_eq!(ctx.resource_name(), "reports.run");
        assert!(ctx.is_permitted());
        ctx.set_denied();
        assert!(!ctx.is_permitted());
    }
}
