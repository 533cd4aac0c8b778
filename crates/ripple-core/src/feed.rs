//! The feed aggregator — pagination and resolution over a stream ledger.
//!
//! Reads a window of a user's stream entries, resolves each `(kind, id)`
//! reference back to its content item through the store, and packages the
//! result with owner metadata and page bounds. Entirely backend-agnostic.

use serde::Serialize;

use crate::{
  item::ContentItem,
  store::FeedStore,
  stream::StreamEntry,
  user::User,
};

/// Items per feed page. A design constant, not user-configurable.
pub const PAGE_SIZE: u64 = 12;

/// A stream entry paired with the content item it points at.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedEntry {
  pub entry: StreamEntry,
  pub item:  ContentItem,
}

/// One page of a user's feed — the computed read model, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
  pub owner:      User,
  /// 1-indexed page number this window represents.
  pub page:       u64,
  pub first_page: u64,
  /// `ceil(entry_count / PAGE_SIZE)`, never below 1.
  pub last_page:  u64,
  pub entries:    Vec<ResolvedEntry>,
}

/// Assemble page `page_number` (1-indexed; 0 is treated as 1) of `owner`'s
/// feed.
///
/// Entries whose referenced item no longer resolves are skipped — a dangling
/// reference must never take down the whole page. A page past the end comes
/// back with an empty entry list, which is a valid response, not an error.
pub async fn page<S: FeedStore>(
  store: &S,
  owner: &User,
  page_number: u64,
) -> Result<FeedPage, S::Error> {
  // The page number is attacker-controlled query input; the offset math
  // must not overflow for u64::MAX.
  let page_number = page_number.max(1);
  let offset = (page_number - 1).saturating_mul(PAGE_SIZE);

  let total = store.entry_count(owner.user_id).await?;
  let last_page = total.div_ceil(PAGE_SIZE).max(1);

  let window = store.stream_page(owner.user_id, offset, PAGE_SIZE).await?;

  let mut entries = Vec::with_capacity(window.len());
  for entry in window {
    match store.item(entry.kind, entry.item_id).await? {
      Some(item) => entries.push(ResolvedEntry { entry, item }),
      None => {
        // Dangling reference; drop the entry and carry on.
        tracing::warn!(
          entry = %entry.entry_id,
          kind = %entry.kind,
          item = %entry.item_id,
          "skipping stream entry with dangling item reference"
        );
      }
    }
  }

  Ok(FeedPage {
    owner: owner.clone(),
    page: page_number,
    first_page: 1,
    last_page,
    entries,
  })
}
