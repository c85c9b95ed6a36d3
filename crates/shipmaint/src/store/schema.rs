//! `SQLite` schema for the document backend.
//!
//! The database is a plain key/value table: one row per storage key, holding
//! the whole serialized document.

/// SQL statement to create the documents table.
pub const CREATE_DOCUMENTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS documents (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_DOCUMENTS_TABLE];

/// Read the document stored under a key.
pub const SELECT_DOCUMENT: &str = "SELECT value FROM documents WHERE key = ?1";

/// Insert or replace the document stored under a key.
pub const UPSERT_DOCUMENT: &str = r"
INSERT INTO documents (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
";
