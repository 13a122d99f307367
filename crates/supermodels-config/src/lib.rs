//! # supermodels-config
//!
//! Layered configuration loading for supermodels using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SUPERMODELS_*` prefix, `__` as separator)
//! 2. Project-level `supermodels.toml`
//! 3. User-level `~/.config/supermodels/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SUPERMODELS_TABLES__META` -> `tables.meta`,
//! `SUPERMODELS_MODELS__USER` -> `models.user`, and so on.
//!
//! # Usage
//!
//! ```no_run
//! use supermodels_config::SuperConfig;
//!
//! let config = SuperConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("metadata table: {}", config.tables.meta);
//! ```

mod database;
mod error;
mod models;
mod tables;

pub use database::{DatabaseConfig, MEMORY_PATH};
pub use error::ConfigError;
pub use models::ModelsConfig;
pub use tables::TablesConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use supermodels_core::ident::validate_identifier;

/// Project-local config file, relative to the working directory.
pub const LOCAL_CONFIG_FILE: &str = "supermodels.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct SuperConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl SuperConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`SuperConfig::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or extract.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse or extract.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("no .env loaded: {e}");
        }
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so callers can add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SUPERMODELS_").split("__"))
    }

    /// Check that table names are usable SQL identifiers and model tags are set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, table) in [
            ("tables.meta", &self.tables.meta),
            ("tables.log", &self.tables.log),
        ] {
            validate_identifier(table).map_err(|e| ConfigError::InvalidValue {
                field: field.to_string(),
                reason: e.to_string(),
            })?;
        }
        if self.tables.meta == self.tables.log {
            return Err(ConfigError::InvalidValue {
                field: "tables.log".to_string(),
                reason: format!("must differ from tables.meta ('{}')", self.tables.meta),
            });
        }
        for (field, tag) in self.models.fields() {
            if tag.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "model tag must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("supermodels").join("config.toml"))
    }
}
