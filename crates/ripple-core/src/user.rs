//! User — the owner of a feed.
//!
//! Registration and session management live outside this core; a user here is
//! only what the feed layer needs: an identity, a display name, an opaque API
//! token, and a privacy flag.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A feed owner. The `token` authenticates API requests in lieu of session
/// cookies; it is opaque, unique, and never serialised into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub user_id:      Uuid,
  pub display_name: String,
  #[serde(skip_serializing)]
  pub token:        String,
  /// `true` hides the feed from unauthenticated browsing in the UI layer.
  pub private:      bool,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::FeedStore::add_user`].
/// The token and timestamps are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub display_name: String,
  pub private:      bool,
}

impl NewUser {
  pub fn new(display_name: impl Into<String>) -> Self {
    Self {
      display_name: display_name.into(),
      private:      false,
    }
  }
}
