//! Cache store trait and the in-memory implementation.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::key::CacheKey;

/// A cached value with the time it was stored.
#[derive(Debug, Clone)]
pub struct CachedEntry {
  pub value: Value,
  pub cached_at: DateTime<Utc>,
}

/// Backing store for the query cache.
///
/// Values are held as JSON so one store serves every region; the layer
/// above owns (de)serialization. Entries live until invalidated - there
/// is no time-based expiry, freshness is invalidation-driven.
pub trait CacheStore: Send + Sync {
  fn get(&self, key: &CacheKey) -> Option<CachedEntry>;

  fn put(&self, key: CacheKey, value: Value);

  fn invalidate(&self, key: &CacheKey);

  /// Drop every entry, e.g. when the identity changes.
  fn clear(&self);
}

/// Store that caches nothing. All reads miss, all writes are discarded.
pub struct NoopStore;

impl CacheStore for NoopStore {
  fn get(&self, _key: &CacheKey) -> Option<CachedEntry> {
    None
  }

  fn put(&self, _key: CacheKey, _value: Value) {}

  fn invalidate(&self, _key: &CacheKey) {}

  fn clear(&self) {}
}

/// Session-scoped in-memory store. This is the default backing store;
/// like the cache it mirrors, it lives and dies with the client.
#[derive(Default)]
pub struct MemoryStore {
  entries: Mutex<HashMap<CacheKey, CachedEntry>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, CachedEntry>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl CacheStore for MemoryStore {
  fn get(&self, key: &CacheKey) -> Option<CachedEntry> {
    self.lock().get(key).cloned()
  }

  fn put(&self, key: CacheKey, value: Value) {
    let entry = CachedEntry {
      value,
      cached_at: Utc::now(),
    };
    self.lock().insert(key, entry);
  }

  fn invalidate(&self, key: &CacheKey) {
    self.lock().remove(key);
  }

  fn clear(&self) {
    self.lock().clear();
  }
}
