//! Service layer tying the database to the owner type registry.
//!
//! `SuperService` wraps `SuperDb` (raw database access), the
//! `OwnerRegistry` (type tag → owner table), and the configured model tags.
//! The registry starts empty; applications register their owner types.
//! All repo methods are implemented as `impl SuperService`.

use supermodels_config::{ModelsConfig, SuperConfig};
use supermodels_core::OwnerRegistry;

use crate::SuperDb;
use crate::error::DatabaseError;

/// Metadata and activity log operations for owner records.
pub struct SuperService {
    db: SuperDb,
    registry: OwnerRegistry,
    models: ModelsConfig,
}

impl SuperService {
    /// Open the configured database with an empty owner registry.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the configuration is invalid or the
    /// database cannot be opened.
    pub async fn new(config: &SuperConfig) -> Result<Self, DatabaseError> {
        let db = SuperDb::open(config).await?;
        Ok(Self::from_db(db, config.models.clone()))
    }

    /// Create from an existing `SuperDb`.
    #[must_use]
    pub fn from_db(db: SuperDb, models: ModelsConfig) -> Self {
        Self {
            db,
            registry: OwnerRegistry::new(),
            models,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &SuperDb {
        &self.db
    }

    #[must_use]
    pub const fn registry(&self) -> &OwnerRegistry {
        &self.registry
    }

    /// Register owner types before deleting owners through the service.
    pub const fn registry_mut(&mut self) -> &mut OwnerRegistry {
        &mut self.registry
    }

    #[must_use]
    pub const fn models(&self) -> &ModelsConfig {
        &self.models
    }
}
