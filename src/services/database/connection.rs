use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use super::schema;

/// Owner of the SQLite connection backing the event store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at `path`; `":memory:"` gives a private
    /// in-memory database.
    ///
    /// # Examples
    /// ```
    /// use plan_grid::services::database::Database;
    /// let db = Database::new(":memory:").unwrap();
    /// db.initialize_schema().unwrap();
    /// ```
    pub fn new(path: &str) -> Result<Self> {
        let conn =
            Connection::open(path).with_context(|| format!("Failed to open database at {}", path))?;

        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("Failed to enable foreign keys")?;

        log::debug!("Opened database at {}", path);
        Ok(Self { conn })
    }

    /// Open the database file at `path`, creating parent directories first.
    pub fn open_file(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        Self::new(&path.to_string_lossy())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates tables and applies column migrations.
    pub fn initialize_schema(&self) -> Result<()> {
        schema::initialize_schema(self.connection())
    }
}
