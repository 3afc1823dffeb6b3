//! Durable key-value storage port.
//!
//! The engine persists exactly two values: the JSON list of read ids and the
//! stringified enabled flag. Anything that can get and set strings by key can
//! back it; SQLite is used by the bridge, an in-memory map by tests.

use std::collections::HashMap;
use std::path::Path;

use crate::database::connection::Database;
use crate::types::errors::StoreError;

/// Synchronous string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory storage, optionally failing every write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `set`/`remove` fail, like a full quota.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io("storage quota exceeded".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.values.remove(key);
        Ok(())
    }
}

/// Storage backed by the `kv_store` table of a SQLite database.
pub struct SqliteStorage {
    db: Database,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and runs migrations.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::open(path)?;
        Ok(Self { db })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }
}

impl KeyValueStore for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.db.get_value(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Ok(self.db.put_value(key, value)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.db.delete_value(key)?;
        Ok(())
    }
}
