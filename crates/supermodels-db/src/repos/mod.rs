//! Repository methods on [`SuperService`](crate::service::SuperService).
//!
//! - `meta`: per-owner key/value metadata with an owner-local read cache
//! - `log`: append-only activity log
//! - `lifecycle`: purging side rows when an owner is deleted

pub mod lifecycle;
pub mod log;
pub mod meta;
