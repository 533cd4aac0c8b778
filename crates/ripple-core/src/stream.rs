//! Stream entries — the per-user ordered ledger behind every feed.
//!
//! An entry is a typed, non-owning pointer to a content item: the `(kind,
//! item_id)` pair is resolved through the per-kind store at read time, never
//! through an untyped reference. The entry carries its *own* timestamp,
//! which may diverge from the item's — bumping it floats an entry back to
//! the top of the feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::ItemKind;

/// One row of a user's stream ledger.
///
/// `owner_id` is the feed the entry appears in — not necessarily the author
/// of the referenced item. When the two differ the entry is a *refeed*.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEntry {
  pub entry_id:   Uuid,
  pub owner_id:   Uuid,
  pub kind:       ItemKind,
  pub item_id:    Uuid,
  /// Orders the feed; mutable after creation, unlike the item's timestamp.
  pub created_at: DateTime<Utc>,
}

impl StreamEntry {
  /// Whether this entry points at content authored by someone other than
  /// the feed owner.
  pub fn is_refeed_of(&self, author_id: Uuid) -> bool {
    self.owner_id != author_id
  }
}
