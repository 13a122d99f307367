use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec;
use crate::owner::OwnerRef;

/// One named metadata value attached to an owner.
///
/// `value` holds the encoded text; [`MetaEntry::decoded`] recovers the value.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MetaEntry {
    pub id: i64,
    pub owner_type: String,
    pub owner_id: i64,
    pub name: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MetaEntry {
    #[must_use]
    pub fn owner(&self) -> OwnerRef {
        OwnerRef::new(self.owner_type.clone(), self.owner_id)
    }

    #[must_use]
    pub fn decoded(&self) -> Option<Value> {
        codec::decode(Some(self.value.as_str()))
    }
}
