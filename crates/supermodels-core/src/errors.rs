//! Cross-cutting error types for supermodels.
//!
//! Storage errors (`DatabaseError`) live in `supermodels-db` and wrap
//! `CoreError` where a core check fails during a database operation.

use thiserror::Error;

/// Errors that can be raised by any supermodels crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The owner type tag is not present in the registry.
    #[error("Unknown owner type: {0}")]
    UnknownOwnerType(String),

    /// A type tag was registered twice with different tables.
    #[error("Owner type '{tag}' is already registered to table '{existing}', cannot map it to '{table}'")]
    RegistryConflict {
        tag: String,
        existing: String,
        table: String,
    },

    /// A table or type name is not a plain SQL identifier.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// A structured metadata value could not be serialized.
    #[error("Encoding failed: {0}")]
    Encoding(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
