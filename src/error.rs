//! Error taxonomy for the data layer.

use thiserror::Error;

/// Result type alias for noteshelf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the data layer.
///
/// Variants carry their causes as strings so errors stay `Clone`;
/// the query cache hands the same failure to every caller waiting on a
/// de-duplicated fetch.
#[derive(Error, Debug, Clone)]
pub enum Error {
  /// The operation requires an authenticated identity and none is present.
  #[error("operation requires an authenticated identity")]
  Unauthenticated,

  /// The remote note service handle has not been bound yet.
  /// Callers should wait for the handle, not retry aggressively.
  #[error("remote note service is not available yet")]
  Unavailable,

  /// The remote service denied a specific-note fetch. Absence and
  /// denial are indistinguishable at this layer.
  #[error("note not found or access denied")]
  NotFoundOrForbidden,

  /// A remote call failed.
  #[error("remote service error: {0}")]
  Remote(String),

  /// Local persistence failed.
  #[error("storage error: {0}")]
  Storage(String),

  /// (De)serialization failed.
  #[error("serialization error: {0}")]
  Serialization(String),

  /// Configuration could not be loaded or parsed.
  #[error("config error: {0}")]
  Config(String),
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Error::Serialization(e.to_string())
  }
}
