//! [`SqliteStore`] — the SQLite implementation of [`FeedStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use ripple_core::{
  item::{ContentItem, ItemBody, ItemKind, NewItem},
  store::FeedStore,
  stream::StreamEntry,
  user::{NewUser, User},
};

use crate::{
  encode::{
    encode_dt, encode_kind, encode_uuid, RawEntry, RawItem, RawItemFields,
    RawUser,
  },
  schema::SCHEMA,
  Error, Result,
};

const USER_COLUMNS: &str = "user_id, display_name, token, private, created_at";
const ENTRY_COLUMNS: &str = "entry_id, owner_id, kind, item_id, created_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Ripple feed store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a user by an arbitrary column. `column` is a compile-time
  /// constant at every call site, never user input.
  async fn user_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
              rusqlite::params![value],
              |row| {
                Ok(RawUser {
                  user_id:      row.get(0)?,
                  display_name: row.get(1)?,
                  token:        row.get(2)?,
                  private:      row.get(3)?,
                  created_at:   row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  /// Append a stream entry row. Item and entry inserts for direct posts go
  /// through [`FeedStore::create_item`] instead, inside one transaction.
  async fn insert_entry(&self, entry: &StreamEntry) -> Result<()> {
    let entry_id_str = encode_uuid(entry.entry_id);
    let owner_id_str = encode_uuid(entry.owner_id);
    let kind_str     = encode_kind(entry.kind).to_owned();
    let item_id_str  = encode_uuid(entry.item_id);
    let at_str       = encode_dt(entry.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO stream_entries (entry_id, owner_id, kind, item_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            entry_id_str,
            owner_id_str,
            kind_str,
            item_id_str,
            at_str
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// The `(table, insert SQL)` pair for a content-item variant.
fn item_table(kind: ItemKind) -> &'static str {
  match kind {
    ItemKind::TextItem => "text_items",
    ItemKind::LinkItem => "link_items",
    ItemKind::ImageItem => "image_items",
    ItemKind::GithubEvent => "github_items",
  }
}

// ─── FeedStore impl ──────────────────────────────────────────────────────────

impl FeedStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:      Uuid::new_v4(),
      display_name: input.display_name,
      // Token issuance proper lives outside the core; this is the stable
      // opaque secret the API authenticates against.
      token:        Uuid::new_v4().simple().to_string(),
      private:      input.private,
      created_at:   Utc::now(),
    };

    let id_str    = encode_uuid(user.user_id);
    let name      = user.display_name.clone();
    let token     = user.token.clone();
    let private   = user.private;
    let at_str    = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, display_name, token, private, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, token, private, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn user_by_token(&self, token: &str) -> Result<Option<User>> {
    self.user_where("token", token.to_owned()).await
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.user_where("user_id", encode_uuid(id)).await
  }

  // ── Content items ─────────────────────────────────────────────────────────

  async fn create_item(
    &self,
    input: NewItem,
  ) -> Result<(ContentItem, StreamEntry)> {
    input.body.validate().map_err(Error::Core)?;

    let now = Utc::now();
    let item = ContentItem {
      item_id:    Uuid::new_v4(),
      author_id:  input.author_id,
      created_at: now,
      body:       input.body,
    };
    let entry = StreamEntry {
      entry_id:   Uuid::new_v4(),
      owner_id:   input.author_id,
      kind:       item.body.kind(),
      item_id:    item.item_id,
      created_at: now,
    };

    let item_id_str   = encode_uuid(item.item_id);
    let author_id_str = encode_uuid(item.author_id);
    let item_at_str   = encode_dt(item.created_at);
    let body          = item.body.clone();

    let entry_id_str  = encode_uuid(entry.entry_id);
    let owner_id_str  = encode_uuid(entry.owner_id);
    let kind_str      = encode_kind(entry.kind).to_owned();
    let entry_at_str  = encode_dt(entry.created_at);

    let event_json = match &body {
      ItemBody::GithubEvent { event } => Some(serde_json::to_string(event)?),
      _ => None,
    };

    // Item row and stream entry land in one transaction: no orphaned item
    // without an entry, no entry without content.
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        match &body {
          ItemBody::TextItem { body } => {
            tx.execute(
              "INSERT INTO text_items (item_id, author_id, body, created_at)
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![item_id_str, author_id_str, body, item_at_str],
            )?;
          }
          ItemBody::LinkItem { link_url, comment } => {
            tx.execute(
              "INSERT INTO link_items (item_id, author_id, url, comment, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)",
              rusqlite::params![
                item_id_str,
                author_id_str,
                link_url,
                comment,
                item_at_str
              ],
            )?;
          }
          ItemBody::ImageItem { image_url, comment } => {
            tx.execute(
              "INSERT INTO image_items (item_id, author_id, url, comment, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)",
              rusqlite::params![
                item_id_str,
                author_id_str,
                image_url,
                comment,
                item_at_str
              ],
            )?;
          }
          ItemBody::GithubEvent { .. } => {
            tx.execute(
              "INSERT INTO github_items (item_id, author_id, event, created_at)
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![
                item_id_str,
                author_id_str,
                event_json,
                item_at_str
              ],
            )?;
          }
        }

        tx.execute(
          "INSERT INTO stream_entries (entry_id, owner_id, kind, item_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            entry_id_str,
            owner_id_str,
            kind_str,
            item_id_str,
            entry_at_str
          ],
        )?;

        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok((item, entry))
  }

  async fn ingest_refeed(
    &self,
    owner_id: Uuid,
    kind: ItemKind,
    item_id: Uuid,
  ) -> Result<StreamEntry> {
    if self.item(kind, item_id).await?.is_none() {
      return Err(Error::ItemNotFound(kind, item_id));
    }

    let entry = StreamEntry {
      entry_id: Uuid::new_v4(),
      owner_id,
      kind,
      item_id,
      created_at: Utc::now(),
    };

    self.insert_entry(&entry).await?;
    Ok(entry)
  }

  async fn item(&self, kind: ItemKind, id: Uuid) -> Result<Option<ContentItem>> {
    let id_str = encode_uuid(id);
    let table = item_table(kind);

    let raw: Option<RawItem> = self
      .conn
      .call(move |conn| {
        let row = match kind {
          ItemKind::TextItem => conn
            .query_row(
              "SELECT item_id, author_id, created_at, body
               FROM text_items WHERE item_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawItem {
                  item_id:    row.get(0)?,
                  author_id:  row.get(1)?,
                  created_at: row.get(2)?,
                  fields:     RawItemFields::Text { body: row.get(3)? },
                })
              },
            )
            .optional()?,
          ItemKind::LinkItem | ItemKind::ImageItem => conn
            .query_row(
              &format!(
                "SELECT item_id, author_id, created_at, url, comment
                 FROM {table} WHERE item_id = ?1"
              ),
              rusqlite::params![id_str],
              |row| {
                let url = row.get(3)?;
                let comment = row.get(4)?;
                Ok(RawItem {
                  item_id:    row.get(0)?,
                  author_id:  row.get(1)?,
                  created_at: row.get(2)?,
                  fields: if kind == ItemKind::LinkItem {
                    RawItemFields::Link { url, comment }
                  } else {
                    RawItemFields::Image { url, comment }
                  },
                })
              },
            )
            .optional()?,
          ItemKind::GithubEvent => conn
            .query_row(
              "SELECT item_id, author_id, created_at, event
               FROM github_items WHERE item_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawItem {
                  item_id:    row.get(0)?,
                  author_id:  row.get(1)?,
                  created_at: row.get(2)?,
                  fields:     RawItemFields::Github { event: row.get(3)? },
                })
              },
            )
            .optional()?,
        };
        Ok(row)
      })
      .await?;

    raw.map(RawItem::into_item).transpose()
  }

  // ── Stream reads ──────────────────────────────────────────────────────────

  async fn entry(
    &self,
    owner_id: Uuid,
    entry_id: Uuid,
  ) -> Result<Option<StreamEntry>> {
    let owner_str = encode_uuid(owner_id);
    let entry_str = encode_uuid(entry_id);

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ENTRY_COLUMNS} FROM stream_entries
                 WHERE owner_id = ?1 AND entry_id = ?2"
              ),
              rusqlite::params![owner_str, entry_str],
              |row| {
                Ok(RawEntry {
                  entry_id:   row.get(0)?,
                  owner_id:   row.get(1)?,
                  kind:       row.get(2)?,
                  item_id:    row.get(3)?,
                  created_at: row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn stream_page(
    &self,
    owner_id: Uuid,
    offset: u64,
    limit: u64,
  ) -> Result<Vec<StreamEntry>> {
    let owner_str = encode_uuid(owner_id);
    // A negative LIMIT or OFFSET changes meaning in SQLite, so out-of-range
    // values clamp instead of wrapping through the cast.
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset = i64::try_from(offset).unwrap_or(i64::MAX);

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          // rowid tie-break keeps ordering stable between entries sharing
          // a timestamp.
          "SELECT {ENTRY_COLUMNS} FROM stream_entries
           WHERE owner_id = ?1
           ORDER BY created_at DESC, rowid ASC
           LIMIT ?2 OFFSET ?3"
        ))?;

        let rows = stmt
          .query_map(rusqlite::params![owner_str, limit, offset], |row| {
            Ok(RawEntry {
              entry_id:   row.get(0)?,
              owner_id:   row.get(1)?,
              kind:       row.get(2)?,
              item_id:    row.get(3)?,
              created_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn entry_count(&self, owner_id: Uuid) -> Result<u64> {
    let owner_str = encode_uuid(owner_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM stream_entries WHERE owner_id = ?1",
          rusqlite::params![owner_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count as u64)
  }

  // ── Stream mutation ───────────────────────────────────────────────────────

  async fn touch_entry(&self, entry_id: Uuid, at: DateTime<Utc>) -> Result<()> {
    let entry_str = encode_uuid(entry_id);
    let at_str = encode_dt(at);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE stream_entries SET created_at = ?1 WHERE entry_id = ?2",
          rusqlite::params![at_str, entry_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::EntryNotFound(entry_id));
    }
    Ok(())
  }
}
