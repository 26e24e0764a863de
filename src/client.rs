//! Cached note client: every remote operation plus its invalidation rules.

use crate::cache::{CacheKey, CacheStore, MemoryStore, QueryCache};
use crate::error::Result;
use crate::service::{
  AttachmentMetadata, Note, NoteId, NoteService, ServiceHandle, UserProfile, UserRole,
};

/// Client for the remote note service with a keyed query cache in front.
///
/// Reads go through the cache; writes go straight to the remote and, on
/// success, invalidate the regions whose data they made stale. All
/// operations fail with `Unavailable` until the service handle is bound.
pub struct NoteClient<S: NoteService, C: CacheStore = MemoryStore> {
  service: ServiceHandle<S>,
  cache: QueryCache<C>,
}

impl<S: NoteService> NoteClient<S, MemoryStore> {
  /// Client over an already-available service, caching in memory.
  pub fn new(service: S) -> Self {
    Self::with_store(ServiceHandle::bound(service), MemoryStore::new())
  }
}

impl<S: NoteService, C: CacheStore> NoteClient<S, C> {
  /// Client over a possibly-unbound handle and an explicit cache store.
  pub fn with_store(service: ServiceHandle<S>, store: C) -> Self {
    Self {
      service,
      cache: QueryCache::new(store),
    }
  }

  /// The service handle, for binding the remote once it is ready.
  pub fn service_handle(&self) -> &ServiceHandle<S> {
    &self.service
  }

  /// Whether queries can execute yet.
  pub fn is_ready(&self) -> bool {
    self.service.is_ready()
  }

  /// Cached list of Verified notes.
  pub async fn get_verified_notes(&self) -> Result<Vec<Note>> {
    let service = self.service.get()?;
    self
      .cache
      .fetch(CacheKey::VerifiedNotes, || service.get_verified_notes())
      .await
  }

  /// Cached list of the caller's submissions, in any state.
  pub async fn get_my_submissions(&self) -> Result<Vec<Note>> {
    let service = self.service.get()?;
    self
      .cache
      .fetch(CacheKey::MySubmissions, || service.get_my_submissions())
      .await
  }

  /// Cached single note. A denial surfaces as `NotFoundOrForbidden`
  /// and is not retried.
  pub async fn get_note_by_id(&self, id: NoteId) -> Result<Note> {
    let service = self.service.get()?;
    self
      .cache
      .fetch(CacheKey::Note(id), || service.get_note_by_id(id))
      .await
  }

  /// Derived view: the caller's Pending submissions. This is the
  /// submissions call filtered locally, not a separate remote listing.
  pub async fn get_pending_notes(&self) -> Result<Vec<Note>> {
    let service = self.service.get()?;
    self
      .cache
      .fetch(CacheKey::PendingNotes, || async move {
        let submissions = service.get_my_submissions().await?;
        Ok(
          submissions
            .into_iter()
            .filter(|note| note.status.is_pending())
            .collect(),
        )
      })
      .await
  }

  /// Submit a new note. It starts Pending; the submissions region is
  /// stale afterwards.
  pub async fn submit_note(
    &self,
    subject: &str,
    unit: &str,
    title: &str,
    description: &str,
    attachments: Vec<AttachmentMetadata>,
  ) -> Result<NoteId> {
    let service = self.service.get()?;
    let id = service
      .submit_note(subject, unit, title, description, attachments)
      .await?;
    self.cache.invalidate(&CacheKey::MySubmissions);
    Ok(id)
  }

  /// Verify (`reject_reason` = None) or reject a note. Every region
  /// that lists or shows the note is stale afterwards.
  pub async fn verify_note(&self, id: NoteId, reject_reason: Option<String>) -> Result<()> {
    let service = self.service.get()?;
    service.verify_note(id, reject_reason).await?;
    self.cache.invalidate(&CacheKey::VerifiedNotes);
    self.cache.invalidate(&CacheKey::MySubmissions);
    self.cache.invalidate(&CacheKey::PendingNotes);
    self.cache.invalidate(&CacheKey::Note(id));
    Ok(())
  }

  /// Cached caller profile; None when no profile has been saved.
  pub async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
    let service = self.service.get()?;
    self
      .cache
      .fetch(CacheKey::CallerProfile, || service.get_caller_user_profile())
      .await
  }

  /// Create or replace the caller's profile.
  pub async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<()> {
    let service = self.service.get()?;
    service.save_caller_user_profile(profile).await?;
    self.cache.invalidate(&CacheKey::CallerProfile);
    Ok(())
  }

  /// Cached caller role.
  pub async fn get_caller_user_role(&self) -> Result<UserRole> {
    let service = self.service.get()?;
    self
      .cache
      .fetch(CacheKey::CallerRole, || service.get_caller_user_role())
      .await
  }

  /// Drop every cached region, e.g. after the identity changes.
  pub fn clear_cache(&self) {
    self.cache.clear();
  }
}
