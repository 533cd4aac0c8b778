//! Error types for `ripple-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::item::ItemKind;

#[derive(Debug, Error)]
pub enum Error {
  /// A per-variant validation failure. The message is surfaced verbatim to
  /// API clients, so it must stay human-readable.
  #[error("{0}")]
  Validation(String),

  #[error("unknown item kind: {0:?}")]
  UnknownKind(String),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("stream entry not found: {0}")]
  EntryNotFound(Uuid),

  #[error("{0} {1} not found")]
  ItemNotFound(ItemKind, Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
