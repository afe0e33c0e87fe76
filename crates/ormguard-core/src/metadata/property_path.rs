//! Resolved attribute paths.

use super::meta_class::MetaProperty;
use std::fmt;

/// A resolved chain of properties starting at a root entity.
///
/// `Order.customer.email` resolves to `[Order.customer, Customer.email]`;
/// each segment keeps its own owning entity in `domain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaPropertyPath {
    root: String,
    properties: Vec<MetaProperty>,
}

impl MetaPropertyPath {
    /// Create a path from its root entity and resolved segments.
    pub fn new(root: impl Into<String>, properties: Vec<MetaProperty>) -> Self {
        Self {
            root: root.into(),
            properties,
        }
    }

    /// Path consisting of a single property.
    pub fn single(property: MetaProperty) -> Self {
        Self {
            root: property.domain.clone(),
            properties: vec![property],
        }
    }

    /// Entity the path starts at.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Every property along the path, in order.
    pub fn meta_properties(&self) -> &[MetaProperty] {
        &self.properties
    }

    /// Last property of the path.
    pub fn last(&self) -> Option<&MetaProperty> {
        self.properties.last()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Check if the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Dotted property names without the root entity, e.g. `customer.email`.
    pub fn property_names(&self) -> String {
        self.properties
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for MetaPropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.root, self.property_names())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = MetaPropertyPath::new(
            "Order",
            vec![
                MetaProperty::reference("Order", "customer", "Customer"),
                MetaProperty::datatype("Customer", "email", "string"),
            ],
        );
        assert_eq!(path.to_string(), "Order.customer.email");
        assert_eq!(path.property_names(), "customer.email");
        assert_eq!(path.len(), 2);
        assert_eq!(path.last().unwrap().domain, "Customer");
    }

    #[test]
    fn test_single() {
        let path = MetaPropertyPath::single(MetaProperty::datatype("Order", "total", "decimal"));
        assert_eq!(path.root(), "Order");
        assert_eq!(path.to_string(), "Order.total");
    }
}
