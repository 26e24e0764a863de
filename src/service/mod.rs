//! Remote note service boundary: domain types, the service trait, the
//! HTTP implementation, and the late-bound handle.

pub mod api;
#[cfg(test)]
pub(crate) mod fake;
pub mod handle;
pub mod http;
pub mod types;

pub use api::NoteService;
pub use handle::ServiceHandle;
pub use http::HttpNoteService;
pub use types::{
  AttachmentMetadata, NewNote, Note, NoteId, NoteStatus, Principal, UserProfile, UserRole,
};
