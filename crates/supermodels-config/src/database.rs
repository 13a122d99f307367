//! Database location.

use serde::{Deserialize, Serialize};

/// In-memory database unless a path is configured.
pub const MEMORY_PATH: &str = ":memory:";

fn default_path() -> String {
    MEMORY_PATH.to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `":memory:"`.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_memory(&self) -> bool {
        self.path == MEMORY_PATH
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_memory() {
        let config = DatabaseConfig::default();
        assert!(config.is_memory());
    }

    #[test]
    fn file_path_is_not_memory() {
        let config = DatabaseConfig {
            path: "./app.db".into(),
        };
        assert!(!config.is_memory());
    }
}
