//! Per-owner metadata cache.
//!
//! Each owner instance holds one `MetaCache`. It is empty until the first
//! read, filled with every decoded value of the owner, and dropped back to
//! empty on every write or delete. A snapshot with no entries is refilled on
//! the next read. It is never shared between instances.

use std::collections::BTreeMap;

use serde_json::Value;

static EMPTY: BTreeMap<String, Value> = BTreeMap::new();

/// Decoded metadata of one owner, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaCache {
    entries: Option<BTreeMap<String, Value>>,
}

impl MetaCache {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: None }
    }

    /// Whether the cache holds a snapshot of the store.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.entries.is_some()
    }

    /// Whether the next read must go to storage: nothing loaded yet, or the
    /// loaded snapshot holds no entries.
    #[must_use]
    pub fn needs_fill(&self) -> bool {
        self.entries.as_ref().is_none_or(BTreeMap::is_empty)
    }

    /// Look up one cached value. `None` if not loaded or not present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.as_ref()?.get(name)
    }

    /// The cached mapping, empty when not loaded.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, Value> {
        self.entries.as_ref().unwrap_or(&EMPTY)
    }

    /// Replace the cached snapshot.
    pub fn fill(&mut self, entries: BTreeMap<String, Value>) -> &BTreeMap<String, Value> {
        self.entries.insert(entries)
    }

    /// Drop the snapshot; the next read repopulates it from storage.
    pub fn invalidate(&mut self) {
        self.entries = None;
    }
}
