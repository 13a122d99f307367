//! Polymorphic owner references and the owner type registry.
//!
//! Metadata and log rows point at their owner with a `(model_type, model_id)`
//! pair instead of a real foreign key, so one side table serves every owner
//! type. The registry maps each type tag back to the owner's table.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cache::MetaCache;
use crate::errors::CoreError;
use crate::ident::validate_identifier;

/// A `(type tag, id)` pair pointing at a row in any owner table.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct OwnerRef {
    pub owner_type: String,
    pub owner_id: i64,
}

impl OwnerRef {
    #[must_use]
    pub fn new(owner_type: impl Into<String>, owner_id: i64) -> Self {
        Self {
            owner_type: owner_type.into(),
            owner_id,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner_type, self.owner_id)
    }
}

/// A domain record that side-table rows can attach to.
pub trait Owner {
    /// Type tag stored in the `model_type` column.
    const MODEL_TYPE: &'static str;

    /// Identifier stored in the `model_id` column.
    fn owner_id(&self) -> i64;

    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::new(Self::MODEL_TYPE, self.owner_id())
    }
}

/// An owner with a metadata store. The owner holds its own cache.
pub trait HasMeta: Owner {
    fn meta_cache(&self) -> &MetaCache;

    fn meta_cache_mut(&mut self) -> &mut MetaCache;
}

/// An owner with an activity log.
pub trait HasLogs: Owner {}

/// Maps owner type tags to the tables holding those owners.
#[derive(Debug, Clone, Default)]
pub struct OwnerRegistry {
    tables: BTreeMap<String, String>,
}

impl OwnerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an owner type under its `MODEL_TYPE` tag.
    ///
    /// # Errors
    ///
    /// See [`OwnerRegistry::register_tag`].
    pub fn register<O: Owner>(&mut self, table: &str) -> Result<&mut Self, CoreError> {
        self.register_tag(O::MODEL_TYPE, table)
    }

    /// Register a type tag. Registering the same pair twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidIdentifier` if `table` is not a plain
    /// identifier, or `CoreError::RegistryConflict` if the tag already maps
    /// to a different table.
    pub fn register_tag(&mut self, tag: &str, table: &str) -> Result<&mut Self, CoreError> {
        validate_identifier(table)?;
        if let Some(existing) = self.tables.get(tag) {
            if existing != table {
                return Err(CoreError::RegistryConflict {
                    tag: tag.to_string(),
                    existing: existing.clone(),
                    table: table.to_string(),
                });
            }
            return Ok(self);
        }
        self.tables.insert(tag.to_string(), table.to_string());
        Ok(self)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.tables.contains_key(tag)
    }

    #[must_use]
    pub fn table_for(&self, tag: &str) -> Option<&str> {
        self.tables.get(tag).map(String::as_str)
    }

    /// Resolve an owner reference to the table holding the owner row.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnknownOwnerType` for an unregistered tag.
    pub fn resolve(&self, owner: &OwnerRef) -> Result<&str, CoreError> {
        self.table_for(&owner.owner_type)
            .ok_or_else(|| CoreError::UnknownOwnerType(owner.owner_type.clone()))
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}
