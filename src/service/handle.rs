//! Late-bound handle to the remote note service.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{Error, Result};

/// A slot for the remote service handle that the host binds once ready.
///
/// Queries must not execute before the remote handle exists; until
/// `bind` is called every resolution fails with [`Error::Unavailable`],
/// which callers should treat as "wait", not "retry". Cloning shares
/// the slot.
pub struct ServiceHandle<S> {
  inner: Arc<OnceCell<S>>,
}

impl<S> ServiceHandle<S> {
  /// Create an empty, unbound handle.
  pub fn unbound() -> Self {
    Self {
      inner: Arc::new(OnceCell::new()),
    }
  }

  /// Create a handle that is bound from the start.
  pub fn bound(service: S) -> Self {
    let handle = Self::unbound();
    let _ = handle.inner.set(service);
    handle
  }

  /// Bind the remote service. Returns the service back if the handle
  /// was already bound; binding happens at most once.
  pub fn bind(&self, service: S) -> std::result::Result<(), S> {
    self.inner.set(service)
  }

  /// Whether the handle has been bound.
  pub fn is_ready(&self) -> bool {
    self.inner.get().is_some()
  }

  /// Resolve the service, or fail with `Unavailable`.
  pub fn get(&self) -> Result<&S> {
    self.inner.get().ok_or(Error::Unavailable)
  }
}

impl<S> Clone for ServiceHandle<S> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<S> Default for ServiceHandle<S> {
  fn default() -> Self {
    Self::unbound()
  }
}
