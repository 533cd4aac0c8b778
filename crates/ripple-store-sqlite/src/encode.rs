//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (which order correctly
//! under lexicographic comparison). GitHub event payloads are stored as
//! compact JSON. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use ripple_core::{
  item::{ContentItem, ItemBody, ItemKind},
  stream::StreamEntry,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ItemKind ────────────────────────────────────────────────────────────────

pub fn encode_kind(kind: ItemKind) -> &'static str { kind.as_str() }

pub fn decode_kind(s: &str) -> Result<ItemKind> {
  Ok(s.parse::<ItemKind>()?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub display_name: String,
  pub token:        String,
  pub private:      bool,
  pub created_at:   String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      display_name: self.display_name,
      token:        self.token,
      private:      self.private,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `stream_entries` row.
pub struct RawEntry {
  pub entry_id:   String,
  pub owner_id:   String,
  pub kind:       String,
  pub item_id:    String,
  pub created_at: String,
}

impl RawEntry {
  pub fn into_entry(self) -> Result<StreamEntry> {
    Ok(StreamEntry {
      entry_id:   decode_uuid(&self.entry_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      kind:       decode_kind(&self.kind)?,
      item_id:    decode_uuid(&self.item_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// The variant-specific columns of a content-item row, as read from the
/// kind's table.
pub enum RawItemFields {
  Text { body: String },
  Link { url: String, comment: Option<String> },
  Image { url: String, comment: Option<String> },
  Github { event: String },
}

/// A content-item row before decoding.
pub struct RawItem {
  pub item_id:    String,
  pub author_id:  String,
  pub created_at: String,
  pub fields:     RawItemFields,
}

impl RawItem {
  pub fn into_item(self) -> Result<ContentItem> {
    let body = match self.fields {
      RawItemFields::Text { body } => ItemBody::TextItem { body },
      RawItemFields::Link { url, comment } => ItemBody::LinkItem {
        link_url: url,
        comment,
      },
      RawItemFields::Image { url, comment } => ItemBody::ImageItem {
        image_url: url,
        comment,
      },
      RawItemFields::Github { event } => ItemBody::GithubEvent {
        event: serde_json::from_str(&event)?,
      },
    };

    Ok(ContentItem {
      item_id:    decode_uuid(&self.item_id)?,
      author_id:  decode_uuid(&self.author_id)?,
      created_at: decode_dt(&self.created_at)?,
      body,
    })
  }
}
