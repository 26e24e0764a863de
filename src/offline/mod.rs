//! Offline persistence for explicitly saved notes.
//!
//! An independent, user-initiated mirror: it never talks to the query
//! cache, and nothing here is synchronized back to the remote service.

mod backend;
mod store;

pub use backend::{MemoryBackend, SqliteBackend, StorageBackend, STORAGE_KEY};
pub use store::{OfflineStore, SavedNote};
