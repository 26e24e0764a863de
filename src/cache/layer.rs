//! Query cache that orchestrates keyed fetching with de-duplication.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;
use tracing::debug;

use crate::error::{Error, Result};

use super::key::CacheKey;
use super::store::CacheStore;

type FlightResult = Result<Value>;
type FlightMap = HashMap<CacheKey, watch::Receiver<Option<FlightResult>>>;

/// Invalidation-driven cache over a [`CacheStore`].
///
/// `fetch` returns the cached value for a region when one exists and
/// otherwise runs the fetcher. While a fetch for a region is in flight,
/// further callers for the same region wait for its result instead of
/// issuing a duplicate remote call. A failed fetch is terminal: the
/// error goes to the leader and every waiter, nothing is retried.
pub struct QueryCache<C: CacheStore> {
  store: Arc<C>,
  inflight: Arc<Mutex<FlightMap>>,
}

enum Role {
  /// This caller runs the fetcher and publishes the result.
  Leader(watch::Sender<Option<FlightResult>>),
  /// Another caller is already fetching this region.
  Waiter(watch::Receiver<Option<FlightResult>>),
  /// The region was populated while taking the in-flight lock.
  Hit(Value),
}

impl<C: CacheStore> QueryCache<C> {
  pub fn new(store: C) -> Self {
    Self {
      store: Arc::new(store),
      inflight: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  /// Return the cached value for `key`, or run `fetcher` to populate it.
  pub async fn fetch<T, F, Fut>(&self, key: CacheKey, fetcher: F) -> Result<T>
  where
    T: Serialize + DeserializeOwned,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    loop {
      if let Some(entry) = self.store.get(&key) {
        debug!(key = %key, "cache hit");
        return decode(entry.value);
      }

      let role = {
        let mut inflight = self.lock_inflight();
        if let Some(rx) = inflight.get(&key) {
          Role::Waiter(rx.clone())
        } else if let Some(entry) = self.store.get(&key) {
          // A fetch completed between the cache check and taking the
          // lock; its value is already stored.
          Role::Hit(entry.value)
        } else {
          let (tx, rx) = watch::channel(None);
          inflight.insert(key.clone(), rx);
          Role::Leader(tx)
        }
      };

      match role {
        Role::Hit(value) => return decode(value),
        Role::Waiter(mut rx) => {
          debug!(key = %key, "awaiting in-flight fetch");
          if rx.changed().await.is_err() {
            return Err(Error::Remote("fetch was cancelled".to_string()));
          }
          let flight = rx.borrow().clone();
          match flight {
            Some(Ok(value)) => return decode(value),
            Some(Err(e)) => return Err(e),
            // Woke before the leader published; re-check from the top.
            None => continue,
          }
        }
        Role::Leader(tx) => {
          debug!(key = %key, "cache miss, fetching");
          return self.publish(&key, &tx, fetcher().await);
        }
      }
    }
  }

  /// Store and publish the leader's fetch result.
  fn publish<T: Serialize>(
    &self,
    key: &CacheKey,
    tx: &watch::Sender<Option<FlightResult>>,
    fetched: Result<T>,
  ) -> Result<T> {
    let outcome = match fetched {
      Ok(data) => match serde_json::to_value(&data) {
        Ok(value) => {
          self.store.put(key.clone(), value.clone());
          Ok((data, value))
        }
        Err(e) => Err(Error::from(e)),
      },
      Err(e) => Err(e),
    };

    // Store write happens before the in-flight entry is removed, so a
    // caller that misses the flight still sees the value.
    self.lock_inflight().remove(key);
    match outcome {
      Ok((data, value)) => {
        let _ = tx.send(Some(Ok(value)));
        Ok(data)
      }
      Err(e) => {
        let _ = tx.send(Some(Err(e.clone())));
        Err(e)
      }
    }
  }

  /// Mark a region stale. The next fetch for it goes to the remote.
  pub fn invalidate(&self, key: &CacheKey) {
    debug!(key = %key, "invalidating");
    self.store.invalidate(key);
  }

  /// Drop every cached region.
  pub fn clear(&self) {
    self.store.clear();
  }

  fn lock_inflight(&self) -> MutexGuard<'_, FlightMap> {
    self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
  Ok(serde_json::from_value(value)?)
}

impl<C: CacheStore> Clone for QueryCache<C> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      inflight: Arc::clone(&self.inflight),
    }
  }
}
