//! SQL schema for the Wellspring SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Entries are immutable; no UPDATE or DELETE is ever issued against this
-- table. `day` is the UTC date of `created_at`.
CREATE TABLE IF NOT EXISTS entries (
    entry_id    TEXT PRIMARY KEY,
    owner       TEXT NOT NULL,
    category    TEXT NOT NULL,   -- 'mood' | 'journal' | 'habit'
    day         TEXT NOT NULL,   -- YYYY-MM-DD
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    body        TEXT NOT NULL,   -- mood word, journal text, or habit checklist
    UNIQUE (owner, category, day)
);

CREATE TABLE IF NOT EXISTS streaks (
    owner         TEXT NOT NULL,
    category      TEXT NOT NULL,
    streak_count  INTEGER NOT NULL DEFAULT 0 CHECK (streak_count >= 0),
    last_date     TEXT,          -- YYYY-MM-DD or NULL
    PRIMARY KEY (owner, category)
);

CREATE TABLE IF NOT EXISTS alerts (
    alert_id    TEXT PRIMARY KEY,
    owner       TEXT NOT NULL,
    day         TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    message     TEXT NOT NULL,
    status      TEXT NOT NULL DEFAULT 'unread',  -- 'unread' | 'read'
    UNIQUE (owner, day)
);

CREATE INDEX IF NOT EXISTS entries_owner_idx ON entries(owner, category, created_at);
CREATE INDEX IF NOT EXISTS alerts_owner_idx  ON alerts(owner, created_at);

PRAGMA user_version = 1;
";
