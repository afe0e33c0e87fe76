//! Entity and property definitions.

use serde::{Deserialize, Serialize};

/// What a property points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyRange {
    /// Scalar value with the given datatype name.
    Datatype {
        /// Datatype name (e.g. `string`, `uuid`, `decimal`).
        datatype: String,
    },
    /// Reference to another entity.
    Association {
        /// Name of the referenced entity.
        entity: String,
        /// Whether the reference is to-many.
        #[serde(default)]
        many: bool,
    },
}

impl PropertyRange {
    /// Name of the referenced entity, if this is an association.
    pub fn association_entity(&self) -> Option<&str> {
        match self {
            PropertyRange::Association { entity, .. } => Some(entity),
            PropertyRange::Datatype { .. } => None,
        }
    }
}

/// A property of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaProperty {
    /// Property name.
    pub name: String,
    /// Entity that declares the property.
    #[serde(default)]
    pub domain: String,
    /// Property range.
    pub range: PropertyRange,
}

impl MetaProperty {
    /// Create a scalar property.
    pub fn datatype(
        domain: impl Into<String>,
        name: impl Into<String>,
        datatype: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            range: PropertyRange::Datatype {
                datatype: datatype.into(),
            },
        }
    }

    /// Create a to-one association.
    pub fn reference(
        domain: impl Into<String>,
        name: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            range: PropertyRange::Association {
                entity: entity.into(),
                many: false,
            },
        }
    }

    /// Create a to-many association.
    pub fn collection(
        domain: impl Into<String>,
        name: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            range: PropertyRange::Association {
                entity: entity.into(),
                many: true,
            },
        }
    }

    /// Check if this property references another entity.
    pub fn is_association(&self) -> bool {
        matches!(self.range, PropertyRange::Association { .. })
    }
}

/// An entity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaClass {
    /// Entity name (unique within the metadata).
    pub name: String,
    /// Declared properties.
    #[serde(default)]
    pub properties: Vec<MetaProperty>,
}

impl MetaClass {
    /// Create an entity class without properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a scalar property.
    pub fn with_datatype(mut self, name: impl Into<String>, datatype: impl Into<String>) -> Self {
        let property = MetaProperty::datatype(self.name.clone(), name, datatype);
        self.properties.push(property);
        self
    }

    /// Add a to-one association.
    pub fn with_reference(mut self, name: impl Into<String>, entity: impl Into<String>) -> Self {
        let property = MetaProperty::reference(self.name.clone(), name, entity);
        self.properties.push(property);
        self
    }

    /// Add a to-many association.
    pub fn with_collection(mut self, name: impl Into<String>, entity: impl Into<String>) -> Self {
        let property = MetaProperty::collection(self.name.clone(), name, entity);
        self.properties.push(property);
        self
    }

    /// Get a property by name.
    pub fn property(&self, name: &str) -> Option<&MetaProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Fill in the domain of properties that were declared without one.
    pub(crate) fn normalize(mut self) -> Self {
        for property in &mut self.properties {
            if property.domain.is_empty() {
                property.domain = self.name.clone();
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_class_builder() {
        let order = MetaClass::new("Order")
            .with_datatype("number", "string")
            .with_reference("customer", "Customer")
            .with_collection("lines", "OrderLine");

        assert_eq!(order.properties.len(), 3);
        assert_eq!(order.property("number").unwrap().domain, "Order");
        assert!(order.property("customer").unwrap().is_association());
        assert!(!order.property("number").unwrap().is_association());
        assert_eq!(
            order.property("lines").unwrap().range.association_entity(),
            Some("OrderLine")
        );
        assert!(order.property("missing").is_none());
    }

    #[test]
    fn test_deserialize_fills_domain() {
        let json = r#"{
            "name": "Customer",
            "properties": [
                { "name": "email", "range": { "kind": "datatype", "datatype": "string" } },
                { "name": "orders", "range": { "kind": "association", "entity": "Order", "many": true } }
            ]
        }"#;
        let class: MetaClass = serde_json::from_str(json).unwrap();
        let class = class.normalize();

        assert_eq!(class.property("email").unwrap().domain, "Customer");
        assert_eq!(class.property("orders").unwrap().domain, "Customer");
    }
}
