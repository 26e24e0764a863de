//! The remote note service boundary.

use async_trait::async_trait;

use crate::error::Result;

use super::types::{AttachmentMetadata, Note, NoteId, UserProfile, UserRole};

/// Operations exposed by the authoritative remote note service.
///
/// The remote side owns all business policy (moderation rules, access
/// control); this layer only consumes the contract. Implementations
/// must be substitutable so the cache and gate logic can be tested
/// without a live backend.
#[async_trait]
pub trait NoteService: Send + Sync {
  /// All notes in the Verified state, publicly listable.
  async fn get_verified_notes(&self) -> Result<Vec<Note>>;

  /// All notes owned by the caller, regardless of state.
  async fn get_my_submissions(&self) -> Result<Vec<Note>>;

  /// A single note by id. Fails with `NotFoundOrForbidden` when the
  /// note is absent or the caller may not view it.
  async fn get_note_by_id(&self, id: NoteId) -> Result<Note>;

  /// Create a Pending note and return its assigned id.
  async fn submit_note(
    &self,
    subject: &str,
    unit: &str,
    title: &str,
    description: &str,
    attachments: Vec<AttachmentMetadata>,
  ) -> Result<NoteId>;

  /// Transition a note Pending → Verified (`reject_reason` = None) or
  /// Pending → Rejected (`reject_reason` = Some). Irreversible.
  async fn verify_note(&self, id: NoteId, reject_reason: Option<String>) -> Result<()>;

  /// The caller's profile, or None if none has been saved yet.
  async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>>;

  /// Create or replace the caller's profile.
  async fn save_caller_user_profile(&self, profile: UserProfile) -> Result<()>;

  /// Whether the caller holds the admin (moderator) role.
  async fn is_caller_admin(&self) -> Result<bool>;

  /// The caller's role as assigned by the remote service.
  async fn get_caller_user_role(&self) -> Result<UserRole>;
}
