//! Content items — the polymorphic units of user-authored content.
//!
//! Every item variant shares an identity, an author, and a creation
//! timestamp; the variant payload carries the type-specific fields. Items
//! are immutable once created — there is no update or delete.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::{Error, Result};

/// URL path extensions accepted for [`ItemBody::ImageItem`].
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "bmp", "png", "gif"];

/// Validation message for a rejected image URL. Surfaced verbatim in the
/// API's 406 response body, so the wording is part of the public contract.
pub const IMAGE_URL_MESSAGE: &str =
  "must be jpg, bmp, png, or gif and start with http/https";

// ─── ItemKind ────────────────────────────────────────────────────────────────

/// The discriminant of a content-item variant.
///
/// The string forms double as the public `type` tag in the JSON contract and
/// the `kind` column in the stream-entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
  TextItem,
  LinkItem,
  ImageItem,
  GithubEvent,
}

impl ItemKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::TextItem => "TextItem",
      Self::LinkItem => "LinkItem",
      Self::ImageItem => "ImageItem",
      Self::GithubEvent => "GithubEvent",
    }
  }

  /// Kinds accepted from the public write endpoint. GitHub events arrive
  /// through the ingest path only.
  pub fn is_postable(&self) -> bool { !matches!(self, Self::GithubEvent) }
}

impl fmt::Display for ItemKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ItemKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "TextItem" => Ok(Self::TextItem),
      "LinkItem" => Ok(Self::LinkItem),
      "ImageItem" => Ok(Self::ImageItem),
      "GithubEvent" => Ok(Self::GithubEvent),
      other => Err(Error::UnknownKind(other.to_string())),
    }
  }
}

// ─── ItemBody ────────────────────────────────────────────────────────────────

/// The typed payload of a content item. The variant name serves as the
/// `type` tag in the JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemBody {
  TextItem {
    body: String,
  },
  LinkItem {
    link_url: String,
    comment:  Option<String>,
  },
  ImageItem {
    image_url: String,
    comment:   Option<String>,
  },
  /// Opaque payload from the GitHub activity ingest; stored as-is.
  GithubEvent {
    event: serde_json::Value,
  },
}

impl ItemBody {
  pub fn kind(&self) -> ItemKind {
    match self {
      Self::TextItem { .. } => ItemKind::TextItem,
      Self::LinkItem { .. } => ItemKind::LinkItem,
      Self::ImageItem { .. } => ItemKind::ImageItem,
      Self::GithubEvent { .. } => ItemKind::GithubEvent,
    }
  }

  /// Per-variant field validation. Runs before anything is persisted; a
  /// failing item leaves no trace in the store.
  pub fn validate(&self) -> Result<()> {
    match self {
      Self::TextItem { body } => {
        if body.trim().is_empty() {
          return Err(Error::Validation("body can't be blank".to_string()));
        }
      }
      Self::LinkItem { link_url, .. } => {
        if !is_http_url(link_url) {
          return Err(Error::Validation(
            "must be a valid http/https url".to_string(),
          ));
        }
      }
      Self::ImageItem { image_url, .. } => {
        // Scheme and extension failures share one message; the original
        // contract does not distinguish them.
        let parsed = Url::parse(image_url)
          .ok()
          .filter(|u| matches!(u.scheme(), "http" | "https"));
        let ok = parsed.is_some_and(|u| has_image_extension(&u));
        if !ok {
          return Err(Error::Validation(IMAGE_URL_MESSAGE.to_string()));
        }
      }
      Self::GithubEvent { .. } => {}
    }
    Ok(())
  }
}

fn is_http_url(raw: &str) -> bool {
  Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// The extension check applies to the URL *path*, so a query string after
/// the extension is fine (`/cat.png?w=200`).
fn has_image_extension(url: &Url) -> bool {
  let path = url.path();
  match path.rsplit_once('.') {
    Some((_, ext)) => {
      let ext = ext.to_ascii_lowercase();
      IMAGE_EXTENSIONS.contains(&ext.as_str())
    }
    None => false,
  }
}

// ─── ContentItem ─────────────────────────────────────────────────────────────

/// A persisted content item. Once written, no field is ever updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
  pub item_id:    Uuid,
  pub author_id:  Uuid,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
  #[serde(flatten)]
  pub body:       ItemBody,
}

// ─── NewItem ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::FeedStore::create_item`].
/// `item_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewItem {
  pub author_id: Uuid,
  pub body:      ItemBody,
}

impl NewItem {
  pub fn new(author_id: Uuid, body: ItemBody) -> Self {
    Self { author_id, body }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
