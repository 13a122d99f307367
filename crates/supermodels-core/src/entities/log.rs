use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::owner::OwnerRef;

/// Category written by [`NewLogEntry`]s.
pub const DEFAULT_LOG_TYPE: &str = "log";

/// An append-only activity log entry recording a user action on an owner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LogEntry {
    pub id: i64,
    pub owner_type: String,
    pub owner_id: i64,
    pub user_id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub action: String,
    pub content: String,
    pub params: Option<Value>,
    /// Set by notification dispatchers outside this crate.
    pub notified: Option<bool>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LogEntry {
    #[must_use]
    pub fn owner(&self) -> OwnerRef {
        OwnerRef::new(self.owner_type.clone(), self.owner_id)
    }

    /// The acting user as a reference under the configured user model tag.
    #[must_use]
    pub fn user_ref(&self, user_model: &str) -> Option<OwnerRef> {
        self.user_id.map(|id| OwnerRef::new(user_model, id))
    }
}

/// Input for writing one log entry.
///
/// `ip` and `user_agent` left unset (or empty) are taken from the request
/// context at write time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLogEntry {
    pub action: String,
    pub content: String,
    pub params: Option<Value>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl NewLogEntry {
    #[must_use]
    pub fn new(action: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    #[must_use]
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}
