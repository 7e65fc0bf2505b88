use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use super::schema::SETTINGS_VERSIONED_SCHEMAS;
use super::source::PropertySource;
use crate::sqlite_persistence;

/// SQLite-backed property source.
///
/// One row per key; writes are upserts stamped with the write time.
pub struct SqlitePropertySource {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePropertySource {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn =
            sqlite_persistence::open_versioned(db_path, SETTINGS_VERSIONED_SCHEMAS, "settings")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = sqlite_persistence::open_in_memory(SETTINGS_VERSIONED_SCHEMAS)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl PropertySource for SqlitePropertySource {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            r#"INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, value, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }
}
