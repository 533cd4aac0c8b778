//! SQL schema for the Ripple SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id      TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    token        TEXT NOT NULL UNIQUE,   -- opaque API token
    private      INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

-- One table per content variant; a stream entry's (kind, item_id) pair
-- selects the table to resolve against.
-- Content items are immutable: no UPDATE or DELETE is ever issued.
CREATE TABLE IF NOT EXISTS text_items (
    item_id    TEXT PRIMARY KEY,
    author_id  TEXT NOT NULL REFERENCES users(user_id),
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL              -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS link_items (
    item_id    TEXT PRIMARY KEY,
    author_id  TEXT NOT NULL REFERENCES users(user_id),
    url        TEXT NOT NULL,
    comment    TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS image_items (
    item_id    TEXT PRIMARY KEY,
    author_id  TEXT NOT NULL REFERENCES users(user_id),
    url        TEXT NOT NULL,
    comment    TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS github_items (
    item_id    TEXT PRIMARY KEY,
    author_id  TEXT NOT NULL REFERENCES users(user_id),
    event      TEXT NOT NULL,             -- opaque JSON payload, stored as-is
    created_at TEXT NOT NULL
);

-- The stream ledger. created_at orders the feed and is the one column in
-- the store that is ever rewritten (float-to-top); ties fall back to rowid,
-- i.e. insertion order.
CREATE TABLE IF NOT EXISTS stream_entries (
    entry_id   TEXT PRIMARY KEY,
    owner_id   TEXT NOT NULL REFERENCES users(user_id),
    kind       TEXT NOT NULL,             -- ItemKind discriminant
    item_id    TEXT NOT NULL,             -- resolved via the kind's table
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS stream_owner_idx
    ON stream_entries(owner_id, created_at);

PRAGMA user_version = 1;
";
