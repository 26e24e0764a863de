//! Keyed, invalidation-driven query cache.
//!
//! This module mediates reads against the remote note service:
//! - Results are cached per typed region ([`CacheKey`])
//! - Concurrent fetches for one region are de-duplicated
//! - Mutations invalidate dependent regions; the next read refetches
//!
//! There is no time-based expiry and no automatic retry.

mod key;
mod layer;
mod store;

pub use key::CacheKey;
pub use layer::QueryCache;
pub use store::{CacheStore, CachedEntry, MemoryStore, NoopStore};
