//! Database schema for the SQLite checkpoint

use rusqlite::Connection;

/// SQL schema for the checkpoint database
pub const SCHEMA_SQL: &str = r#"
-- One row per extracted record, in crawl order
CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_url TEXT NOT NULL,
    source TEXT NOT NULL,
    category TEXT NOT NULL,
    year INTEGER NOT NULL,
    document_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_records_source ON records(source);

-- Named detail fields; NULL marks a value missing from the page
CREATE TABLE IF NOT EXISTS record_fields (
    record_id INTEGER NOT NULL REFERENCES records(id),
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    value TEXT,
    PRIMARY KEY (record_id, position)
);

-- When the checkpoint was written and how many records it holds
CREATE TABLE IF NOT EXISTS checkpoint_info (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    created_at TEXT NOT NULL,
    record_count INTEGER NOT NULL
);
"#;

/// Creates all tables and indexes if they do not exist
pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
