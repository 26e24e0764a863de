//! Client-side data layer for a note-sharing portal.
//!
//! Users submit study notes, moderators verify or reject them, and the
//! public browses verified notes. This crate is the layer between a UI
//! and the remote note service:
//!
//! - [`NoteClient`] wraps every remote operation with a keyed,
//!   invalidation-driven query cache ([`cache`])
//! - [`OfflineStore`] keeps a local, identity-gated mirror of notes the
//!   user explicitly saved for offline viewing ([`offline`])
//! - [`Session`] and [`RoleGate`] answer "who is signed in" and "is the
//!   caller a moderator" for conditional rendering ([`auth`])
//! - [`Query`] carries loading/success/error state into an event-loop
//!   UI ([`query`])
//!
//! The remote service stays authoritative: this layer never enforces
//! policy, it only caches, gates views, and mirrors.

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod offline;
pub mod query;
pub mod service;

pub use auth::{RoleGate, Session};
pub use cache::{CacheKey, CacheStore, MemoryStore, NoopStore, QueryCache};
pub use client::NoteClient;
pub use config::Config;
pub use error::{Error, Result};
pub use offline::{MemoryBackend, OfflineStore, SavedNote, SqliteBackend, StorageBackend};
pub use query::{Query, QueryState};
pub use service::{
  AttachmentMetadata, HttpNoteService, Note, NoteId, NoteService, NoteStatus, Principal,
  ServiceHandle, UserProfile, UserRole,
};
