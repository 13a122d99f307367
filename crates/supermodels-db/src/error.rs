//! Database error types for supermodels-db.

use supermodels_config::ConfigError;
use supermodels_core::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned unparseable data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Stored metadata did not fit the requested shape.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// The type tag or its table belongs to the metadata or log side tables.
    #[error("'{0}' refers to metadata or log rows, which cannot own side rows")]
    NotAnOwner(String),

    /// A core check failed (unknown owner type, encoding, identifiers).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Configuration rejected at open time.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
