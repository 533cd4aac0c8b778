//! The public JSON contract.
//!
//! Pure functions from resolved stream entries to the wire shapes. Every
//! serialised item carries the same common keys regardless of variant —
//! `refeed` and `refeed_link` are always present, with `null` standing in
//! when the entry is not a refeed. Clients test key presence, so none of
//! these fields may be skipped when empty.

use ripple_core::{
  feed::FeedPage,
  item::{ContentItem, ItemBody, ItemKind},
  stream::StreamEntry,
  user::User,
};
use serde::Serialize;
use uuid::Uuid;

// ─── Canonical URLs ──────────────────────────────────────────────────────────

/// Builds canonical API URLs from the configured public base URL.
#[derive(Debug, Clone)]
pub struct Urls {
  base: String,
}

impl Urls {
  pub fn new(base_url: &str) -> Self {
    Self {
      base: base_url.trim_end_matches('/').to_string(),
    }
  }

  /// The single-item URL for an entry in `owner_id`'s feed.
  pub fn item(&self, owner_id: Uuid, entry_id: Uuid) -> String {
    format!("{}/api/users/{owner_id}/items/{entry_id}", self.base)
  }

  pub fn feed(&self, owner_id: Uuid) -> String {
    format!("{}/api/users/{owner_id}/feed", self.base)
  }

  pub fn feed_page(&self, owner_id: Uuid, page: u64) -> String {
    format!("{}?page={page}", self.feed(owner_id))
  }
}

// ─── Item shape ──────────────────────────────────────────────────────────────

/// Variant-specific keys, flattened into the item object.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ItemFields {
  Text {
    body: String,
  },
  Link {
    link_url: String,
    comment:  Option<String>,
  },
  Image {
    image_url: String,
    comment:   Option<String>,
  },
  Github {
    event: serde_json::Value,
  },
}

/// One serialised stream item.
#[derive(Debug, Clone, Serialize)]
pub struct ItemJson {
  #[serde(rename = "type")]
  pub kind:        ItemKind,
  /// The content item's id, not the stream entry's.
  pub id:          Uuid,
  /// The content item's creation time, RFC 3339. The entry's own (mutable)
  /// timestamp only drives ordering.
  pub created_at:  String,
  /// Canonical URL of this item within the owner's feed.
  pub link:        String,
  /// The feed owner.
  pub feed:        Uuid,
  /// Original author when this entry is a refeed; `null` otherwise.
  pub refeed:      Option<Uuid>,
  /// The original author's feed URL when this entry is a refeed.
  pub refeed_link: Option<String>,
  #[serde(flatten)]
  pub fields:      ItemFields,
}

/// Serialise one resolved stream item.
pub fn item(entry: &StreamEntry, item: &ContentItem, urls: &Urls) -> ItemJson {
  let refeed = entry
    .is_refeed_of(item.author_id)
    .then_some(item.author_id);

  let fields = match &item.body {
    ItemBody::TextItem { body } => ItemFields::Text { body: body.clone() },
    ItemBody::LinkItem { link_url, comment } => ItemFields::Link {
      link_url: link_url.clone(),
      comment:  comment.clone(),
    },
    ItemBody::ImageItem { image_url, comment } => ItemFields::Image {
      image_url: image_url.clone(),
      comment:   comment.clone(),
    },
    ItemBody::GithubEvent { event } => ItemFields::Github { event: event.clone() },
  };

  ItemJson {
    kind: item.body.kind(),
    id: item.item_id,
    created_at: item.created_at.to_rfc3339(),
    link: urls.item(entry.owner_id, entry.entry_id),
    feed: entry.owner_id,
    refeed,
    refeed_link: refeed.map(|author| urls.feed(author)),
    fields,
  }
}

// ─── Feed shape ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FeedItems {
  pub most_recent: Vec<ItemJson>,
  /// Canonical URL of the first feed page.
  pub first_page:  String,
  /// Canonical URL of the last feed page.
  pub last_page:   String,
}

/// One serialised feed page.
#[derive(Debug, Clone, Serialize)]
pub struct FeedJson {
  pub name:    String,
  pub id:      Uuid,
  pub private: bool,
  pub link:    String,
  pub items:   FeedItems,
}

/// Serialise a resolved feed page.
pub fn feed_page(page: &FeedPage, urls: &Urls) -> FeedJson {
  let owner: &User = &page.owner;

  let most_recent = page
    .entries
    .iter()
    .map(|resolved| item(&resolved.entry, &resolved.item, urls))
    .collect();

  FeedJson {
    name: owner.display_name.clone(),
    id: owner.user_id,
    private: owner.private,
    link: urls.feed(owner.user_id),
    items: FeedItems {
      most_recent,
      first_page: urls.feed_page(owner.user_id, page.first_page),
      last_page:  urls.feed_page(owner.user_id, page.last_page),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;

  fn urls() -> Urls { Urls::new("http://api.example.com/") }

  #[test]
  fn base_url_trailing_slash_is_normalised() {
    let owner = Uuid::new_v4();
    let url = urls().feed(owner);
    assert_eq!(url, format!("http://api.example.com/api/users/{owner}/feed"));
  }

  #[test]
  fn refeed_keys_are_null_for_own_content() {
    let author = Uuid::new_v4();
    let item_record = ContentItem {
      item_id:    Uuid::new_v4(),
      author_id:  author,
      created_at: Utc::now(),
      body:       ItemBody::TextItem { body: "hi".into() },
    };
    let entry = StreamEntry {
      entry_id:   Uuid::new_v4(),
      owner_id:   author,
      kind:       ItemKind::TextItem,
      item_id:    item_record.item_id,
      created_at: item_record.created_at,
    };

    let value = serde_json::to_value(item(&entry, &item_record, &urls())).unwrap();
    assert!(value.get("refeed").is_some_and(|v| v.is_null()));
    assert!(value.get("refeed_link").is_some_and(|v| v.is_null()));
    assert_eq!(value["type"], "TextItem");
    assert_eq!(value["body"], "hi");
  }

  #[test]
  fn refeed_keys_point_at_the_author_for_foreign_content() {
    let author = Uuid::new_v4();
    let owner = Uuid::new_v4();
    let item_record = ContentItem {
      item_id:    Uuid::new_v4(),
      author_id:  author,
      created_at: Utc::now(),
      body:       ItemBody::TextItem { body: "theirs".into() },
    };
    let entry = StreamEntry {
      entry_id:   Uuid::new_v4(),
      owner_id:   owner,
      kind:       ItemKind::TextItem,
      item_id:    item_record.item_id,
      created_at: Utc::now(),
    };

    let value = serde_json::to_value(item(&entry, &item_record, &urls())).unwrap();
    assert_eq!(value["refeed"], author.to_string());
    assert_eq!(value["refeed_link"], urls().feed(author));
    assert_eq!(value["feed"], owner.to_string());
  }

  #[test]
  fn comment_is_null_not_missing() {
    let author = Uuid::new_v4();
    let item_record = ContentItem {
      item_id:    Uuid::new_v4(),
      author_id:  author,
      created_at: Utc::now(),
      body:       ItemBody::ImageItem {
        image_url: "http://foo.com/cat.png".into(),
        comment:   None,
      },
    };
    let entry = StreamEntry {
      entry_id:   Uuid::new_v4(),
      owner_id:   author,
      kind:       ItemKind::ImageItem,
      item_id:    item_record.item_id,
      created_at: item_record.created_at,
    };

    let value = serde_json::to_value(item(&entry, &item_record, &urls())).unwrap();
    assert_eq!(value["image_url"], "http://foo.com/cat.png");
    assert!(value.get("comment").is_some_and(|v| v.is_null()));
  }
}
