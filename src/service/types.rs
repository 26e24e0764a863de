//! Domain types for the note-sharing portal.
//!
//! Wire representations are kept separate from domain types: the remote
//! service speaks the legacy `verified` + `rejectionReason` field pair,
//! while the domain models the note lifecycle as a tagged `NoteStatus`
//! so the invalid combination (verified and rejected at once) cannot be
//! represented.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Identifier assigned to a note by the remote listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u64);

impl NoteId {
  pub fn value(self) -> u64 {
    self.0
  }
}

impl fmt::Display for NoteId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<u64> for NoteId {
  fn from(v: u64) -> Self {
    NoteId(v)
  }
}

impl FromStr for NoteId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(NoteId(s.parse()?))
  }
}

// Note ids travel as strings on the wire (the backend hands out 64-bit
// ids, which don't survive JSON number parsing in every client), but
// older payloads carry plain numbers. Accept both, emit strings.
impl Serialize for NoteId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for NoteId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    struct IdVisitor;

    impl Visitor<'_> for IdVisitor {
      type Value = NoteId;

      fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a note id as a string or unsigned integer")
      }

      fn visit_u64<E: de::Error>(self, v: u64) -> Result<NoteId, E> {
        Ok(NoteId(v))
      }

      fn visit_str<E: de::Error>(self, v: &str) -> Result<NoteId, E> {
        v.parse().map(NoteId).map_err(de::Error::custom)
      }
    }

    deserializer.deserialize_any(IdVisitor)
  }
}

/// Opaque principal identifying a caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
  pub fn new(id: impl Into<String>) -> Self {
    Principal(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Principal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Lifecycle state of a note. Exactly one of the three applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteStatus {
  /// Submitted, awaiting moderation.
  Pending,
  /// Approved by a moderator and publicly visible.
  Verified,
  /// Rejected by a moderator, with the reason given.
  Rejected { reason: String },
}

impl NoteStatus {
  pub fn is_pending(&self) -> bool {
    matches!(self, NoteStatus::Pending)
  }

  pub fn is_verified(&self) -> bool {
    matches!(self, NoteStatus::Verified)
  }

  pub fn is_rejected(&self) -> bool {
    matches!(self, NoteStatus::Rejected { .. })
  }

  /// The rejection reason, if the note was rejected.
  pub fn rejection_reason(&self) -> Option<&str> {
    match self {
      NoteStatus::Rejected { reason } => Some(reason),
      _ => None,
    }
  }
}

/// Metadata describing an attached file. No binary payload is modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentMetadata {
  pub filename: String,
  /// Free-text file type as reported by the uploader.
  pub file_type: String,
  pub file_size: u64,
}

/// A submitted study note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireNote", into = "WireNote")]
pub struct Note {
  pub subject: String,
  pub unit: String,
  pub title: String,
  pub description: String,
  pub status: NoteStatus,
  /// Creation time, nanoseconds since the Unix epoch.
  pub created_timestamp: i64,
  /// Last update time, nanoseconds since the Unix epoch.
  pub last_updated_timestamp: i64,
  pub uploader: Principal,
  pub attachments: Vec<AttachmentMetadata>,
}

/// Wire shape of a note: the legacy boolean + optional-reason pair.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireNote {
  subject: String,
  unit: String,
  title: String,
  description: String,
  verified: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  rejection_reason: Option<String>,
  created_timestamp: i64,
  last_updated_timestamp: i64,
  uploader: Principal,
  #[serde(default)]
  attachments: Vec<AttachmentMetadata>,
}

impl TryFrom<WireNote> for Note {
  type Error = String;

  fn try_from(wire: WireNote) -> Result<Self, Self::Error> {
    let status = match (wire.verified, wire.rejection_reason) {
      (true, None) => NoteStatus::Verified,
      (false, Some(reason)) => NoteStatus::Rejected { reason },
      (false, None) => NoteStatus::Pending,
      (true, Some(_)) => {
        return Err("note cannot be both verified and rejected".to_string());
      }
    };

    Ok(Note {
      subject: wire.subject,
      unit: wire.unit,
      title: wire.title,
      description: wire.description,
      status,
      created_timestamp: wire.created_timestamp,
      last_updated_timestamp: wire.last_updated_timestamp,
      uploader: wire.uploader,
      attachments: wire.attachments,
    })
  }
}

impl From<Note> for WireNote {
  fn from(note: Note) -> Self {
    let (verified, rejection_reason) = match note.status {
      NoteStatus::Verified => (true, None),
      NoteStatus::Rejected { reason } => (false, Some(reason)),
      NoteStatus::Pending => (false, None),
    };

    WireNote {
      subject: note.subject,
      unit: note.unit,
      title: note.title,
      description: note.description,
      verified,
      rejection_reason,
      created_timestamp: note.created_timestamp,
      last_updated_timestamp: note.last_updated_timestamp,
      uploader: note.uploader,
      attachments: note.attachments,
    }
  }
}

/// Fields for a new note submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
  pub subject: String,
  pub unit: String,
  pub title: String,
  pub description: String,
  pub attachments: Vec<AttachmentMetadata>,
}

/// Caller-visible user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
  pub name: String,
}

/// Authorization tier of a caller. Admin implies moderator capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
  Admin,
  User,
  Guest,
}

impl UserRole {
  pub fn is_moderator(self) -> bool {
    matches!(self, UserRole::Admin)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn wire_json(verified: bool, reason: Option<&str>) -> String {
    let reason_field = match reason {
      Some(r) => format!(r#","rejectionReason":"{}""#, r),
      None => String::new(),
    };
    format!(
      r#"{{"subject":"Math","unit":"1","title":"T","description":"D",
          "verified":{}{},"createdTimestamp":1,"lastUpdatedTimestamp":2,
          "uploader":"aaa","attachments":[]}}"#,
      verified, reason_field
    )
  }

  #[test]
  fn decodes_pending_note() {
    let note: Note = serde_json::from_str(&wire_json(false, None)).unwrap();
    assert!(note.status.is_pending());
    assert_eq!(note.status.rejection_reason(), None);
  }

  #[test]
  fn decodes_verified_note() {
    let note: Note = serde_json::from_str(&wire_json(true, None)).unwrap();
    assert!(note.status.is_verified());
  }

  #[test]
  fn decodes_rejected_note() {
    let note: Note = serde_json::from_str(&wire_json(false, Some("too short"))).unwrap();
    assert_eq!(note.status.rejection_reason(), Some("too short"));
  }

  #[test]
  fn rejects_verified_with_reason() {
    let result: Result<Note, _> = serde_json::from_str(&wire_json(true, Some("bad")));
    assert!(result.is_err());
  }

  #[test]
  fn note_roundtrips_through_wire_format() {
    let note: Note = serde_json::from_str(&wire_json(false, Some("illegible"))).unwrap();
    let json = serde_json::to_string(&note).unwrap();
    let back: Note = serde_json::from_str(&json).unwrap();
    assert_eq!(note, back);
  }

  #[test]
  fn note_id_accepts_string_and_number() {
    let from_str: NoteId = serde_json::from_str(r#""42""#).unwrap();
    let from_num: NoteId = serde_json::from_str("42").unwrap();
    assert_eq!(from_str, NoteId(42));
    assert_eq!(from_num, NoteId(42));
    assert_eq!(serde_json::to_string(&NoteId(42)).unwrap(), r#""42""#);
  }

  #[test]
  fn admin_is_moderator() {
    assert!(UserRole::Admin.is_moderator());
    assert!(!UserRole::User.is_moderator());
    assert!(!UserRole::Guest.is_moderator());
  }
}
