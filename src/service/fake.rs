//! In-memory note service used by unit tests across the crate.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::api::NoteService;
use super::types::{AttachmentMetadata, Note, NoteId, NoteStatus, Principal, UserProfile, UserRole};

/// Remote-call counters, for asserting cache hits and de-duplication.
#[derive(Default)]
pub struct CallCounts {
  pub verified_notes: AtomicUsize,
  pub my_submissions: AtomicUsize,
  pub note_by_id: AtomicUsize,
  pub is_admin: AtomicUsize,
  pub profile: AtomicUsize,
}

struct FakeInner {
  caller: Principal,
  admin: AtomicBool,
  notes: Mutex<BTreeMap<NoteId, Note>>,
  next_id: AtomicU64,
  profile: Mutex<Option<UserProfile>>,
  calls: CallCounts,
}

/// A fake [`NoteService`] with seedable state and call counters.
#[derive(Clone)]
pub struct FakeNoteService {
  inner: Arc<FakeInner>,
}

impl FakeNoteService {
  pub fn new() -> Self {
    Self {
      inner: Arc::new(FakeInner {
        caller: Principal::new("caller"),
        admin: AtomicBool::new(false),
        notes: Mutex::new(BTreeMap::new()),
        next_id: AtomicU64::new(1),
        profile: Mutex::new(None),
        calls: CallCounts::default(),
      }),
    }
  }

  pub fn calls(&self) -> &CallCounts {
    &self.inner.calls
  }

  pub fn set_admin(&self, admin: bool) {
    self.inner.admin.store(admin, Ordering::SeqCst);
  }

  /// Insert a note owned by the fake's caller, in the given state.
  pub fn seed_note(&self, title: &str, status: NoteStatus) -> NoteId {
    let id = NoteId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
    let note = Note {
      subject: "Subject".to_string(),
      unit: "1".to_string(),
      title: title.to_string(),
      description: "Description".to_string(),
      status,
      created_timestamp: 1_000,
      last_updated_timestamp: 1_000,
      uploader: self.inner.caller.clone(),
      attachments: Vec::new(),
    };
    self.notes_lock().insert(id, note);
    id
  }

  pub fn note(&self, id: NoteId) -> Option<Note> {
    self.notes_lock().get(&id).cloned()
  }

  fn notes_lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<NoteId, Note>> {
    self
      .inner
      .notes
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
  }
}

#[async_trait]
impl NoteService for FakeNoteService {
  async fn get_verified_notes(&self) -> Result<Vec<Note>> {
    self.inner.calls.verified_notes.fetch_add(1, Ordering::SeqCst);
    Ok(
      self
        .notes_lock()
        .values()
        .filter(|n| n.status.is_verified())
        .cloned()
        .collect(),
    )
  }

  async fn get_my_submissions(&self) -> Result<Vec<Note>> {
    self.inner.calls.my_submissions.fetch_add(1, Ordering::SeqCst);
    Ok(
      self
        .notes_lock()
        .values()
        .filter(|n| n.uploader == self.inner.caller)
        .cloned()
        .collect(),
    )
  }

  async fn get_note_by_id(&self, id: NoteId) -> Result<Note> {
    self.inner.calls.note_by_id.fetch_add(1, Ordering::SeqCst);
    self.note(id).ok_or(Error::NotFoundOrForbidden)
  }

  async fn submit_note(
    &self,
    subject: &str,
    unit: &str,
    title: &str,
    description: &str,
    attachments: Vec<AttachmentMetadata>,
  ) -> Result<NoteId> {
    let id = NoteId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
    let note = Note {
      subject: subject.to_string(),
      unit: unit.to_string(),
      title: title.to_string(),
      description: description.to_string(),
      status: NoteStatus::Pending,
      created_timestamp: 2_000,
      last_updated_timestamp: 2_000,
      uploader: self.inner.caller.clone(),
      attachments,
    };
    self.notes_lock().insert(id, note);
    Ok(id)
  }

  async fn verify_note(&self, id: NoteId, reject_reason: Option<String>) -> Result<()> {
    let mut notes = self.notes_lock();
    let note = notes.get_mut(&id).ok_or(Error::NotFoundOrForbidden)?;
    note.status = match reject_reason {
      None => NoteStatus::Verified,
      Some(reason) => NoteStatus::Rejected { reason },
    };
    note.last_updated_timestamp += 1;
    Ok(())
  }

  async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
    self.inner.calls.profile.fetch_add(1, Ordering::SeqCst);
    Ok(
      self
        .inner
        .profile
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone(),
    )
  }

  async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<()> {
    *self
      .inner
      .profile
      .lock()
      .unwrap_or_else(PoisonError::into_inner) = Some(profile);
    Ok(())
  }

  async fn is_caller_admin(&self) -> Result<bool> {
    self.inner.calls.is_admin.fetch_add(1, Ordering::SeqCst);
    Ok(self.inner.admin.load(Ordering::SeqCst))
  }

  async fn get_caller_user_role(&self) -> Result<UserRole> {
    Ok(if self.inner.admin.load(Ordering::SeqCst) {
      UserRole::Admin
    } else {
      UserRole::User
    })
  }
}
