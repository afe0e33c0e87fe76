//! Core error types.

use thiserror::Error;

/// Core errors for metadata, storage and configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Entity is not registered in the metadata.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Property does not exist on the entity.
    #[error("unknown property: {entity}.{property}")]
    UnknownProperty {
        /// Entity the lookup was performed on.
        entity: String,
        /// Missing property name.
        property: String,
    },

    /// A non-final path segment does not reference another entity.
    #[error("property {entity}.{property} is not an association")]
    NotAnAssociation {
        /// Entity owning the property.
        entity: String,
        /// Property name.
        property: String,
    },

    /// Configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error while reading configuration.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
