//! Typed cache regions.

use std::fmt;

use crate::service::NoteId;

/// The cache regions of the query layer.
///
/// The regions are a closed enumeration rather than string literals so
/// an invalidation can never miss its target through a key typo.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
  /// Publicly listable Verified notes.
  VerifiedNotes,
  /// The caller's own submissions, in any state.
  MySubmissions,
  /// Derived view: the caller's Pending submissions.
  PendingNotes,
  /// A single note.
  Note(NoteId),
  /// The caller's profile.
  CallerProfile,
  /// The caller's assigned role.
  CallerRole,
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheKey::VerifiedNotes => f.write_str("verifiedNotes"),
      CacheKey::MySubmissions => f.write_str("mySubmissions"),
      CacheKey::PendingNotes => f.write_str("pendingNotes"),
      CacheKey::Note(id) => write!(f, "note:{}", id),
      CacheKey::CallerProfile => f.write_str("callerProfile"),
      CacheKey::CallerRole => f.write_str("callerRole"),
    }
  }
}
