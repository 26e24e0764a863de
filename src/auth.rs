//! Identity session and the role gate.
//!
//! Authentication itself is delegated to an external identity provider;
//! the host application tells the session who is signed in. The gate
//! only decides what to show - enforcement stays with the remote
//! service.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::debug;

use crate::error::Result;
use crate::service::{NoteService, Principal, ServiceHandle};

/// The current identity session, shared between the offline store, the
/// role gate, and the host application. Cloning shares the session.
#[derive(Clone, Default)]
pub struct Session {
  identity: Arc<RwLock<Option<Principal>>>,
}

impl Session {
  /// A session with nobody signed in.
  pub fn anonymous() -> Self {
    Self::default()
  }

  /// A session already signed in as `identity`.
  pub fn signed_in(identity: Principal) -> Self {
    let session = Self::anonymous();
    session.set_identity(Some(identity));
    session
  }

  /// Record a sign-in (`Some`) or sign-out (`None`).
  pub fn set_identity(&self, identity: Option<Principal>) {
    let mut guard = self
      .identity
      .write()
      .unwrap_or_else(PoisonError::into_inner);
    *guard = identity;
  }

  /// The signed-in principal, if any.
  pub fn identity(&self) -> Option<Principal> {
    self
      .identity
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  pub fn is_authenticated(&self) -> bool {
    self.identity().is_some()
  }
}

/// Answers "is the caller a moderator" for conditional rendering.
///
/// The answer is cached per identity and re-derived whenever the
/// session identity changes. Unauthenticated callers are never admins
/// and cost no remote call.
pub struct RoleGate<S: NoteService> {
  service: ServiceHandle<S>,
  session: Session,
  cached: Mutex<Option<(Principal, bool)>>,
}

impl<S: NoteService> RoleGate<S> {
  pub fn new(service: ServiceHandle<S>, session: Session) -> Self {
    Self {
      service,
      session,
      cached: Mutex::new(None),
    }
  }

  /// Whether the current caller holds the admin (moderator) role.
  pub async fn is_caller_admin(&self) -> Result<bool> {
    let Some(identity) = self.session.identity() else {
      *self.lock_cached() = None;
      return Ok(false);
    };

    if let Some((cached_for, admin)) = self.lock_cached().as_ref() {
      if *cached_for == identity {
        return Ok(*admin);
      }
    }

    let service = self.service.get()?;
    let admin = service.is_caller_admin().await?;
    debug!(identity = %identity, admin, "derived caller role");
    *self.lock_cached() = Some((identity, admin));
    Ok(admin)
  }

  /// Whether an identity session is present at all.
  pub fn is_authenticated(&self) -> bool {
    self.session.is_authenticated()
  }

  fn lock_cached(&self) -> std::sync::MutexGuard<'_, Option<(Principal, bool)>> {
    self.cached.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::service::fake::FakeNoteService;
  use std::sync::atomic::Ordering;

  #[tokio::test]
  async fn unauthenticated_caller_is_never_admin() {
    let fake = FakeNoteService::new();
    fake.set_admin(true);
    let gate = RoleGate::new(ServiceHandle::bound(fake.clone()), Session::anonymous());

    assert!(!gate.is_caller_admin().await.unwrap());
    // No session, so the remote was never asked.
    assert_eq!(fake.calls().is_admin.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn admin_answer_is_cached_per_identity() {
    let fake = FakeNoteService::new();
    fake.set_admin(true);
    let session = Session::signed_in(Principal::new("alice"));
    let gate = RoleGate::new(ServiceHandle::bound(fake.clone()), session);

    assert!(gate.is_caller_admin().await.unwrap());
    assert!(gate.is_caller_admin().await.unwrap());
    assert_eq!(fake.calls().is_admin.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn identity_change_rederives_the_role() {
    let fake = FakeNoteService::new();
    fake.set_admin(true);
    let session = Session::signed_in(Principal::new("alice"));
    let gate = RoleGate::new(ServiceHandle::bound(fake.clone()), session.clone());

    assert!(gate.is_caller_admin().await.unwrap());

    fake.set_admin(false);
    session.set_identity(Some(Principal::new("bob")));
    assert!(!gate.is_caller_admin().await.unwrap());
    assert_eq!(fake.calls().is_admin.load(Ordering::SeqCst), 2);
  }

  #[tokio::test]
  async fn sign_out_clears_the_cached_answer() {
    let fake = FakeNoteService::new();
    fake.set_admin(true);
    let session = Session::signed_in(Principal::new("alice"));
    let gate = RoleGate::new(ServiceHandle::bound(fake.clone()), session.clone());

    assert!(gate.is_caller_admin().await.unwrap());
    session.set_identity(None);
    assert!(!gate.is_caller_admin().await.unwrap());

    // Signing back in re-derives rather than reusing the stale answer.
    session.set_identity(Some(Principal::new("alice")));
    fake.set_admin(false);
    assert!(!gate.is_caller_admin().await.unwrap());
    assert_eq!(fake.calls().is_admin.load(Ordering::SeqCst), 2);
  }
}
