//! Entity metadata used by security constraints.
//!
//! Only the parts needed to address entities and attribute paths are modelled:
//! entity names, their properties, and the owning entity of every property.

mod meta_class;
mod property_path;
mod registry;

pub use meta_class::{MetaClass, MetaProperty, PropertyRange};
pub use property_path::MetaPropertyPath;
pub use registry::Metadata;
