//! Row entities for the metadata and activity log side tables.

mod log;
mod meta;

pub use log::{DEFAULT_LOG_TYPE, LogEntry, NewLogEntry};
pub use meta::MetaEntry;
