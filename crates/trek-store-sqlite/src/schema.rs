//! SQL schema for the trek SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    avatar_url  TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS places (
    place_id    TEXT PRIMARY KEY,
    name        TEXT NOT NULL CHECK (length(trim(name)) > 0),
    region      TEXT,
    latitude    REAL,
    longitude   REAL,
    created_at  TEXT NOT NULL,
    created_by  TEXT REFERENCES users(user_id)
);

-- order_index is rewritten one row at a time during a reorder, so it is
-- deliberately not UNIQUE.
CREATE TABLE IF NOT EXISTS route_items (
    item_id     TEXT PRIMARY KEY,
    place_id    TEXT NOT NULL REFERENCES places(place_id),
    order_index INTEGER NOT NULL CHECK (order_index > 0),
    status      TEXT NOT NULL DEFAULT 'planned'
                CHECK (status IN ('planned', 'in_progress', 'completed', 'skipped')),
    start_date  TEXT,              -- YYYY-MM-DD
    end_date    TEXT,              -- YYYY-MM-DD
    notes       TEXT,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS suggestions (
    suggestion_id TEXT PRIMARY KEY,
    place_id      TEXT NOT NULL REFERENCES places(place_id),
    title         TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description   TEXT,
    category      TEXT NOT NULL
                  CHECK (category IN ('activity', 'food', 'hotel', 'transport', 'other')),
    link          TEXT CHECK (link IS NULL OR link LIKE 'http://_%' OR link LIKE 'https://_%'),
    cost_estimate TEXT,
    created_at    TEXT NOT NULL,
    created_by    TEXT REFERENCES users(user_id)
);

-- One vote per (suggestion, user).
CREATE TABLE IF NOT EXISTS votes (
    vote_id       TEXT PRIMARY KEY,
    suggestion_id TEXT NOT NULL REFERENCES suggestions(suggestion_id),
    user_id       TEXT NOT NULL REFERENCES users(user_id),
    value         INTEGER NOT NULL CHECK (value IN (-1, 1)),
    created_at    TEXT NOT NULL,
    UNIQUE (suggestion_id, user_id)
);

CREATE TABLE IF NOT EXISTS todos (
    todo_id     TEXT PRIMARY KEY,
    title       TEXT NOT NULL CHECK (length(trim(title)) > 0),
    description TEXT,
    due_date    TEXT,              -- YYYY-MM-DD
    assignee_id TEXT REFERENCES users(user_id),
    status      TEXT NOT NULL DEFAULT 'open' CHECK (status IN ('open', 'done')),
    created_at  TEXT NOT NULL,
    created_by  TEXT REFERENCES users(user_id),
    updated_at  TEXT NOT NULL,
    updated_by  TEXT REFERENCES users(user_id)
);

-- Audit records are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table. actor_id carries no
-- foreign key: an unresolvable actor is shown as unknown.
CREATE TABLE IF NOT EXISTS audit_logs (
    audit_id    TEXT PRIMARY KEY,
    action_type TEXT NOT NULL
                CHECK (action_type IN ('create', 'update', 'delete', 'reorder')),
    entity_type TEXT NOT NULL
                CHECK (entity_type IN ('route_item', 'suggestion', 'vote', 'todo', 'place', 'user')),
    entity_id   TEXT NOT NULL,     -- row UUID or 'auto-route'
    actor_id    TEXT,
    before_json TEXT,
    after_json  TEXT,
    created_at  TEXT NOT NULL      -- RFC 3339 UTC, microseconds; store-assigned
);

CREATE INDEX IF NOT EXISTS route_items_order_idx ON route_items(order_index);
CREATE INDEX IF NOT EXISTS suggestions_place_idx ON suggestions(place_id);
CREATE INDEX IF NOT EXISTS votes_suggestion_idx  ON votes(suggestion_id);
CREATE INDEX IF NOT EXISTS todos_created_idx     ON todos(created_at);
CREATE INDEX IF NOT EXISTS audit_created_idx     ON audit_logs(created_at);

PRAGMA user_version = 1;
";
