//! SQLite persistence for accounts and messages.

pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

pub use store::{AccountStore, MessageStore};

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Shared handle behind both [`AccountStore`] and [`MessageStore`].
///
/// Built once at startup and injected into the API rules as trait objects.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::bootstrap(conn)?;
        info!(path = %path.display(), "Database opened");
        Ok(db)
    }

    /// Fresh private database, gone when the handle drops.
    pub fn open_in_memory() -> Result<Self> {
        let db = Self::bootstrap(Connection::open_in_memory()?)?;
        info!("In-memory database opened");
        Ok(db)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        // posted_by must point at a real account
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` with exclusive access to the connection; one statement group at a time.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("database connection lock poisoned: {}", e))?;
        f(&conn)
    }
}
