use rusqlite::Connection;

use crate::error::StorageError;

pub const SCHEMA_VERSION: i32 = 1;

pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA cache_size = -32000;
        PRAGMA busy_timeout = 5000;
    ",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

// `row_index` and `slot` bounds must track `MAX_ROWS` and `Slot::ALL`.
const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL
);
INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, unixepoch());

CREATE TABLE IF NOT EXISTS sheets (
    sheet_id BLOB PRIMARY KEY CHECK (length(sheet_id) = 16),
    customer_name TEXT NOT NULL DEFAULT '',
    order_id TEXT NOT NULL DEFAULT '',
    contact_person TEXT NOT NULL DEFAULT '',
    notes TEXT NOT NULL DEFAULT '',
    stage TEXT NOT NULL DEFAULT 'quoting',
    created_at INTEGER NOT NULL DEFAULT (CAST(unixepoch('now','subsec') * 1000 AS INTEGER)),
    updated_at INTEGER NOT NULL DEFAULT (CAST(unixepoch('now','subsec') * 1000 AS INTEGER))
);
CREATE INDEX IF NOT EXISTS idx_sheets_stage ON sheets (stage, created_at);

CREATE TABLE IF NOT EXISTS cells (
    sheet_id BLOB NOT NULL REFERENCES sheets (sheet_id) ON DELETE CASCADE,
    row_index INTEGER NOT NULL CHECK (row_index >= 0 AND row_index < 10000),
    slot INTEGER NOT NULL CHECK (slot >= 0 AND slot < 10),
    kind TEXT NOT NULL CHECK (kind IN ('text', 'image')),
    content TEXT NOT NULL,
    PRIMARY KEY (sheet_id, row_index, slot)
) WITHOUT ROWID;
";
