//! Error types for the PROVREG system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Could not find {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    /// A stored row violates a domain invariant (wrong variant tag,
    /// missing required field for its discriminator). Never retried,
    /// never defaulted.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
