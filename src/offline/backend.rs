//! Persistence backends for the offline store.
//!
//! The stored shape is a single JSON document under one fixed key, so
//! the backend surface is just read/write of that one payload. The
//! store logic never touches a medium directly, which keeps it testable
//! and lets hosts substitute their own persistence.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};

use crate::config::Config;
use crate::error::{Error, Result};

/// Fixed key the saved-notes collection lives under.
pub const STORAGE_KEY: &str = "offline_saved_notes";

/// Durable read/write of the offline store payload.
pub trait StorageBackend: Send + Sync {
  /// The stored payload, or None if nothing was ever written.
  fn read(&self) -> Result<Option<String>>;

  /// Replace the stored payload wholesale.
  fn write(&self, payload: &str) -> Result<()>;
}

/// Schema for the key-value table backing the offline store.
const OFFLINE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS offline_store (
    key TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// SQLite-backed durable storage.
pub struct SqliteBackend {
  conn: Mutex<Connection>,
}

impl SqliteBackend {
  /// Open or create the store at the default per-user location.
  pub fn open_default() -> Result<Self> {
    Self::open(&Self::default_path()?)
  }

  /// Open or create the store at the configured location, falling back
  /// to the default per-user location when none is set.
  pub fn from_config(config: &Config) -> Result<Self> {
    match &config.offline.db_path {
      Some(path) => Self::open(path),
      None => Self::open_default(),
    }
  }

  /// Open or create the store at `path`.
  pub fn open(path: &Path) -> Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| Error::Storage(format!("failed to create store directory: {}", e)))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| Error::Storage(format!("failed to open store at {}: {}", path.display(), e)))?;

    conn
      .execute_batch(OFFLINE_SCHEMA)
      .map_err(|e| Error::Storage(format!("failed to run store migrations: {}", e)))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| Error::Storage("could not determine data directory".to_string()))?;

    Ok(data_dir.join("noteshelf").join("offline.db"))
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
    self.conn.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl StorageBackend for SqliteBackend {
  fn read(&self) -> Result<Option<String>> {
    let conn = self.lock();

    conn
      .query_row(
        "SELECT payload FROM offline_store WHERE key = ?",
        params![STORAGE_KEY],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| Error::Storage(format!("failed to read offline store: {}", e)))
  }

  fn write(&self, payload: &str) -> Result<()> {
    let conn = self.lock();

    conn
      .execute(
        "INSERT OR REPLACE INTO offline_store (key, payload, updated_at)
         VALUES (?, ?, datetime('now'))",
        params![STORAGE_KEY, payload],
      )
      .map_err(|e| Error::Storage(format!("failed to write offline store: {}", e)))?;

    Ok(())
  }
}

/// In-memory backend. Cloning shares the payload, which lets tests
/// observe exactly what a store persisted.
#[derive(Clone, Default)]
pub struct MemoryBackend {
  payload: Arc<Mutex<Option<String>>>,
}

impl MemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  /// A backend pre-seeded with a stored payload.
  pub fn with_payload(payload: impl Into<String>) -> Self {
    let backend = Self::new();
    *backend.lock() = Some(payload.into());
    backend
  }

  /// The currently stored payload, for inspection.
  pub fn payload(&self) -> Option<String> {
    self.lock().clone()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
    self.payload.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl StorageBackend for MemoryBackend {
  fn read(&self) -> Result<Option<String>> {
    Ok(self.lock().clone())
  }

  fn write(&self, payload: &str) -> Result<()> {
    *self.lock() = Some(payload.to_string());
    Ok(())
  }
}
