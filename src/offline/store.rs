//! Identity-gated mirror of notes saved for offline viewing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::Session;
use crate::error::{Error, Result};
use crate::service::{Note, NoteId};

use super::backend::StorageBackend;

/// A note snapshot kept locally for disconnected viewing.
///
/// Entries are created and removed only by explicit user action and are
/// never synchronized back to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedNote {
  pub id: NoteId,
  pub note: Note,
  /// When the user saved this entry, milliseconds since the Unix epoch.
  pub saved_at: i64,
}

struct Mirror {
  notes: Vec<SavedNote>,
  loaded: bool,
}

/// The offline saved-notes store.
///
/// Holds an in-memory mirror of the persisted collection. Mutations
/// require an authenticated session and rewrite the whole collection;
/// lookups are pure reads over the mirror and report nothing while no
/// identity is present. Storage is scoped per
/// profile, not per identity - identity only gates access, so on a
/// shared profile another user's saved notes become visible after
/// switching identities. Known limitation of the stored format.
pub struct OfflineStore<B: StorageBackend> {
  backend: B,
  session: Session,
  mirror: Mutex<Mirror>,
}

impl<B: StorageBackend> OfflineStore<B> {
  pub fn new(backend: B, session: Session) -> Self {
    Self {
      backend,
      session,
      mirror: Mutex::new(Mirror {
        notes: Vec::new(),
        loaded: false,
      }),
    }
  }

  /// Load the saved collection into the mirror and return it.
  ///
  /// Unauthenticated sessions see an empty collection and the backend
  /// is not read (the persisted data stays untouched). Unreadable or
  /// malformed payloads reset the view to empty instead of erroring.
  pub fn load(&self) -> Vec<SavedNote> {
    let mut mirror = self.lock_mirror();

    if !self.session.is_authenticated() {
      mirror.notes.clear();
      mirror.loaded = false;
      return Vec::new();
    }

    mirror.notes = self.read_backend();
    mirror.loaded = true;
    mirror.notes.clone()
  }

  /// Save a note snapshot under `id`, replacing any previous entry for
  /// the same id. Fails with `Unauthenticated` when nobody is signed
  /// in; the store is not touched in that case.
  pub fn save(&self, id: NoteId, note: Note) -> Result<()> {
    if !self.session.is_authenticated() {
      return Err(Error::Unauthenticated);
    }

    let mut mirror = self.lock_mirror();
    self.ensure_loaded(&mut mirror);

    let mut updated: Vec<SavedNote> = mirror
      .notes
      .iter()
      .filter(|entry| entry.id != id)
      .cloned()
      .collect();
    updated.push(SavedNote {
      id,
      note,
      saved_at: Utc::now().timestamp_millis(),
    });

    self.persist(&updated)?;
    mirror.notes = updated;
    Ok(())
  }

  /// Remove the entry for `id`, if present. Fails with
  /// `Unauthenticated` when nobody is signed in.
  pub fn remove(&self, id: NoteId) -> Result<()> {
    if !self.session.is_authenticated() {
      return Err(Error::Unauthenticated);
    }

    let mut mirror = self.lock_mirror();
    self.ensure_loaded(&mut mirror);

    let updated: Vec<SavedNote> = mirror
      .notes
      .iter()
      .filter(|entry| entry.id != id)
      .cloned()
      .collect();

    self.persist(&updated)?;
    mirror.notes = updated;
    Ok(())
  }

  /// Whether an entry for `id` exists in the mirror. Pure lookup;
  /// always false while nobody is signed in.
  pub fn is_saved(&self, id: NoteId) -> bool {
    if !self.session.is_authenticated() {
      return false;
    }
    self.lock_mirror().notes.iter().any(|entry| entry.id == id)
  }

  /// The mirrored entry for `id`, if any. Pure lookup; always None
  /// while nobody is signed in.
  pub fn get(&self, id: NoteId) -> Option<SavedNote> {
    if !self.session.is_authenticated() {
      return None;
    }
    self
      .lock_mirror()
      .notes
      .iter()
      .find(|entry| entry.id == id)
      .cloned()
  }

  /// The current mirrored collection, empty while nobody is signed in.
  pub fn saved_notes(&self) -> Vec<SavedNote> {
    if !self.session.is_authenticated() {
      return Vec::new();
    }
    self.lock_mirror().notes.clone()
  }

  /// Whole-collection replace of the persisted payload.
  fn persist(&self, notes: &[SavedNote]) -> Result<()> {
    let payload = serde_json::to_string(notes)?;
    self.backend.write(&payload)
  }

  /// Read the persisted collection, treating anything unreadable as
  /// empty. A corrupt payload stays on the medium until the next
  /// successful write replaces it.
  fn read_backend(&self) -> Vec<SavedNote> {
    let raw = match self.backend.read() {
      Ok(Some(raw)) => raw,
      Ok(None) => return Vec::new(),
      Err(e) => {
        warn!(error = %e, "failed to read offline store, treating as empty");
        return Vec::new();
      }
    };

    match serde_json::from_str(&raw) {
      Ok(notes) => notes,
      Err(e) => {
        warn!(error = %e, "offline store payload is malformed, resetting view to empty");
        Vec::new()
      }
    }
  }

  fn ensure_loaded(&self, mirror: &mut MutexGuard<'_, Mirror>) {
    if !mirror.loaded {
      mirror.notes = self.read_backend();
      mirror.loaded = true;
    }
  }

  fn lock_mirror(&self) -> MutexGuard<'_, Mirror> {
    self.mirror.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
