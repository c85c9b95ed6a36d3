//! Key/value backends holding the serialized document.
//!
//! A backend only stores strings under keys; it knows nothing about records.

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{SCHEMA_STATEMENTS, SELECT_DOCUMENT, UPSERT_DOCUMENT};

/// String storage addressed by key.
pub trait DocumentBackend: Send + Debug {
    /// Short description for status output, e.g. the database path.
    fn describe(&self) -> String;

    /// Read the value under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// `SQLite` file backend.
#[derive(Debug)]
pub struct SqliteBackend {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteBackend {
    /// Open or create a database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the table cannot
    /// be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::initialize(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::initialize(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    fn initialize(conn: &Connection) -> Result<()> {
        for statement in SCHEMA_STATEMENTS {
            conn.execute(statement, [])?;
        }
        Ok(())
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DocumentBackend for SqliteBackend {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(SELECT_DOCUMENT, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(UPSERT_DOCUMENT, (key, value))?;
        Ok(())
    }
}

/// Process-local backend, for tests and throwaway sessions.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    /// An empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that already holds `value` under `key`.
    #[must_use]
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }
}

impl DocumentBackend for MemoryBackend {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(backend: &mut dyn DocumentBackend) {
        assert_eq!(backend.read("doc").unwrap(), None);
        backend.write("doc", "{\"a\":1}").unwrap();
        assert_eq!(backend.read("doc").unwrap().as_deref(), Some("{\"a\":1}"));
        backend.write("doc", "{\"a\":2}").unwrap();
        assert_eq!(backend.read("doc").unwrap().as_deref(), Some("{\"a\":2}"));
        assert_eq!(backend.read("other").unwrap(), None);
    }

    #[test]
    fn test_memory_backend() {
        exercise(&mut MemoryBackend::new());
    }

    #[test]
    fn test_sqlite_in_memory_backend() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        assert_eq!(backend.describe(), "sqlite::memory:");
        exercise(&mut backend);
    }

    #[test]
    fn test_sqlite_file_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("records.db");

        {
            let mut backend = SqliteBackend::open(&path).unwrap();
            backend.write("doc", "persisted").unwrap();
        }

        let backend = SqliteBackend::open(&path).unwrap();
        assert_eq!(backend.path(), path.as_path());
        assert_eq!(backend.read("doc").unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_memory_with_entry() {
        let backend = MemoryBackend::with_entry("k", "v");
        assert_eq!(backend.read("k").unwrap().as_deref(), Some("v"));
    }
}
