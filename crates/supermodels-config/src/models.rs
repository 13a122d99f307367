//! Logical model roles and the type tags they are stored under.

use serde::{Deserialize, Serialize};

fn default_user() -> String {
    "user".to_string()
}

fn default_meta() -> String {
    "meta".to_string()
}

fn default_log() -> String {
    "log".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ModelsConfig {
    /// Type tag of the acting user model, referenced by `user_id` on log rows.
    #[serde(default = "default_user")]
    pub user: String,

    /// Type tag of metadata rows when they are themselves referenced.
    #[serde(default = "default_meta")]
    pub meta: String,

    /// Type tag of log rows when they are themselves referenced.
    #[serde(default = "default_log")]
    pub log: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            meta: default_meta(),
            log: default_log(),
        }
    }
}

impl ModelsConfig {
    pub(crate) fn fields(&self) -> [(&'static str, &str); 3] {
        [
            ("models.user", self.user.as_str()),
            ("models.meta", self.meta.as_str()),
            ("models.log", self.log.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ModelsConfig::default();
        assert_eq!(config.user, "user");
        assert_eq!(config.meta, "meta");
        assert_eq!(config.log, "log");
    }
}
