//! Physical table names for the side tables.

use serde::{Deserialize, Serialize};

fn default_meta() -> String {
    "metadata".to_string()
}

fn default_log() -> String {
    "logs".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TablesConfig {
    #[serde(default = "default_meta")]
    pub meta: String,

    #[serde(default = "default_log")]
    pub log: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            meta: default_meta(),
            log: default_log(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = TablesConfig::default();
        assert_eq!(config.meta, "metadata");
        assert_eq!(config.log, "logs");
    }
}
