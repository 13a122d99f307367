//! # supermodels-core
//!
//! Core types shared across the supermodels crates:
//! - Entity structs for metadata rows and activity log rows
//! - Polymorphic owner references and the owner type registry
//! - The metadata value codec (encode on write, type recovery on read)
//! - The per-owner metadata cache
//! - Explicit request context for attributing log entries
//! - Cross-cutting error types

pub mod cache;
pub mod codec;
pub mod context;
pub mod entities;
pub mod errors;
pub mod ident;
pub mod owner;

pub use cache::MetaCache;
pub use context::RequestContext;
pub use errors::CoreError;
pub use owner::{HasLogs, HasMeta, Owner, OwnerRef, OwnerRegistry};
