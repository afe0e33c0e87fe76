//! Metadata registry.

use super::meta_class::MetaClass;
use super::property_path::MetaPropertyPath;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of entity classes by name.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    classes: HashMap<String, Arc<MetaClass>>,
}

impl Metadata {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of classes.
    pub fn from_classes(classes: impl IntoIterator<Item = MetaClass>) -> Self {
        let mut metadata = Self::new();
        for class in classes {
            metadata.register(class);
        }
        metadata
    }

    /// Register a class, replacing any previous class with the same name.
    pub fn register(&mut self, class: MetaClass) -> Arc<MetaClass> {
        let class = Arc::new(class.normalize());
        self.classes.insert(class.name.clone(), class.clone());
        class
    }

    /// Add a class.
    pub fn with_class(mut self, class: MetaClass) -> Self {
        self.register(class);
        self
    }

    /// Look up a class by name.
    pub fn find_class(&self, name: &str) -> Option<Arc<MetaClass>> {
        self.classes.get(name).cloned()
    }

    /// Look up a class by name, failing if it is not registered.
    pub fn class(&self, name: &str) -> Result<Arc<MetaClass>> {
        self.find_class(name)
            .ok_or_else(|| Error::UnknownEntity(name.to_string()))
    }

    /// Names of all registered classes, sorted.
    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a dotted path such as `customer.address.city` against a class.
    ///
    /// Every segment except the last must be an association.
    pub fn property_path(&self, class: &MetaClass, path: &str) -> Result<MetaPropertyPath> {
        let mut properties = Vec::new();
        let mut current = self.class(&class.name)?;
        let segments: Vec<&str> = path.split('.').collect();

        for (i, segment) in segments.iter().enumerate() {
            let property = current
                .property(segment)
                .cloned()
                .ok_or_else(|| Error::UnknownProperty {
                    entity: current.name.clone(),
                    property: segment.to_string(),
                })?;

            if i + 1 < segments.len() {
                let next = property.range.association_entity().ok_or_else(|| {
                    Error::NotAnAssociation {
                        entity: current.name.clone(),
                        property: segment.to_string(),
                    }
                })?;
                let next = self.class(next)?;
                properties.push(property);
                current = next;
            } else {
                properties.push(property);
            }
        }

        Ok(MetaPropertyPath::new(class.name.clone(), properties))
    }
}
