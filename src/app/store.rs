// src/app/store.rs: string key/value persistence
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{info, warn};

/// Synchronous string store that survives restarts.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove(&self, key: &str) -> Result<(), String>;
}

const SQL_CREATE: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
  key   TEXT PRIMARY KEY NOT NULL,
  value TEXT NOT NULL
)
"#;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!("failed to create store dir {}: {e}", parent.display());
                }
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(SQL_CREATE)?;
        info!("Opened key/value store at {}", path.display());
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> rusqlite::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SQL_CREATE)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, key: &str) -> Option<String> {
        match self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
        {
            Ok(v) => v,
            Err(e) => {
                warn!("store read `{key}` failed: {e}");
                None
            }
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), String> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
            .map_err(|e| format!("store write `{key}`: {e}"))
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .map(|_| ())
            .map_err(|e| format!("store delete `{key}`: {e}"))
    }
}

/// Process-local store. Used as a test double and when the database can't be opened.
#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    writes: RefCell<Vec<(String, String)>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Every successful `save` call, in order.
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.borrow().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), String> {
        if self.fail_writes.get() {
            return Err(format!("store write `{key}`: storage unavailable"));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes
            .borrow_mut()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        if self.fail_writes.get() {
            return Err(format!("store delete `{key}`: storage unavailable"));
        }
        self.values.borrow_mut().remove(key);
        Ok(())
    }
}
