//! The `kv_store` database behind [`SqliteStorage`](crate::services::storage::SqliteStorage).
//!
//! Opening configures the connection (WAL journal, busy timeout), then
//! brings the schema up to date. The key-value queries live here so the
//! storage port only maps errors.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, OptionalExtension};

use super::migrations;

/// How long a write waits on a lock held by another bridge process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file and migrates it.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened, configured or migrated.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        Self::prepare(Connection::open(path)?)
    }

    /// Same as [`Database::open`] for a private in-memory database.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // In-memory databases answer "memory" and keep their journal mode.
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    /// Inserts or overwrites `key`, stamping `updated_at`.
    pub fn put_value(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, unix_now()],
        )?;
        Ok(())
    }

    /// Returns whether a row was deleted.
    pub fn delete_value(&self, key: &str) -> Result<bool, rusqlite::Error> {
        let rows = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
