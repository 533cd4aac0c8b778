//! The `FeedStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `ripple-store-sqlite`).
//! Higher layers (`ripple-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  item::{ContentItem, ItemKind, NewItem},
  stream::StreamEntry,
  user::{NewUser, User},
};

/// Abstraction over a Ripple feed store backend.
///
/// Content items are immutable and writes are append-only; the only in-place
/// mutation the trait permits is a stream entry's timestamp
/// ([`touch_entry`](FeedStore::touch_entry)).
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FeedStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. The store assigns the identity and the
  /// opaque authentication token.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// The authentication collaborator: look up a user by API token.
  /// Returns `None` for an unknown token.
  fn user_by_token<'a>(
    &'a self,
    token: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Content items ─────────────────────────────────────────────────────

  /// Validate and persist a content item, appending a stream entry to the
  /// author's own feed in the same logical operation. Both succeed or both
  /// fail — a validation error leaves nothing behind.
  fn create_item(
    &self,
    input: NewItem,
  ) -> impl Future<Output = Result<(ContentItem, StreamEntry), Self::Error>>
  + Send
  + '_;

  /// Append a stream entry in `owner_id`'s feed pointing at an existing
  /// item (normally authored by someone else — a refeed). Fails if the
  /// referenced item does not exist.
  fn ingest_refeed(
    &self,
    owner_id: Uuid,
    kind: ItemKind,
    item_id: Uuid,
  ) -> impl Future<Output = Result<StreamEntry, Self::Error>> + Send + '_;

  /// Resolve a `(kind, id)` reference to its content item.
  /// Returns `None` for a dangling reference.
  fn item(
    &self,
    kind: ItemKind,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ContentItem>, Self::Error>> + Send + '_;

  // ── Stream reads ──────────────────────────────────────────────────────

  /// Retrieve a single stream entry in `owner_id`'s feed.
  fn entry(
    &self,
    owner_id: Uuid,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<Option<StreamEntry>, Self::Error>> + Send + '_;

  /// A window of `owner_id`'s stream, ordered by entry timestamp descending
  /// with ties broken by insertion order. A restartable read: any
  /// offset/limit may be requested without mutating state.
  fn stream_page(
    &self,
    owner_id: Uuid,
    offset: u64,
    limit: u64,
  ) -> impl Future<Output = Result<Vec<StreamEntry>, Self::Error>> + Send + '_;

  /// Total number of entries in `owner_id`'s stream.
  fn entry_count(
    &self,
    owner_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Stream mutation ───────────────────────────────────────────────────

  /// Rewrite an entry's timestamp. Takes effect on the next read — used to
  /// float an entry back to the top of its feed.
  fn touch_entry(
    &self,
    entry_id: Uuid,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
