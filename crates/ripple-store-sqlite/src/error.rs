//! Error type for `ripple-store-sqlite`.

use ripple_core::item::ItemKind;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ripple_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to touch a stream entry that was not found.
  #[error("stream entry not found: {0}")]
  EntryNotFound(Uuid),

  /// A refeed ingest pointed at a content item that does not exist.
  #[error("{0} {1} not found")]
  ItemNotFound(ItemKind, Uuid),
}

impl Error {
  /// The validation message when this is a field-level validation failure,
  /// `None` otherwise. The API layer maps these to 406 responses.
  pub fn validation_message(&self) -> Option<&str> {
    match self {
      Error::Core(ripple_core::Error::Validation(msg)) => Some(msg),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
