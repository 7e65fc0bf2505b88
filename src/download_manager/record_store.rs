//! Storage for MMS notification records.
//!
//! The download-state manager only needs three operations on a record: load
//! it, overwrite its status, delete it. The SQLite implementation also
//! inserts records so the binary and the tests can seed them.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use super::schema::{MMS_NOTIFICATIONS_TABLE, MMS_NOTIFICATIONS_VERSIONED_SCHEMAS};
use crate::sqlite_persistence;

/// Identifier of a message record in the store.
pub type MessageId = i64;

/// A received MMS notification awaiting (or done with) retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub id: MessageId,
    /// Packed download status, `None` until the first transition.
    pub status: Option<i32>,
    /// Unix timestamp (seconds) after which the message cannot be retrieved.
    pub expiry: i64,
    pub subject: Option<String>,
}

impl MessageRecord {
    pub fn new(id: MessageId, expiry: i64) -> Self {
        Self {
            id,
            status: None,
            expiry,
            subject: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether the record expired strictly before `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiry < now
    }
}

/// Record storage operations consumed by the download-state manager.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RecordStore: Send + Sync {
    /// Load a record. `Ok(None)` if there is no record with this id.
    fn load(&self, id: MessageId) -> Result<Option<MessageRecord>>;

    /// Overwrite the status field. Returns false if the record is gone.
    fn update_status(&self, id: MessageId, status: i32) -> Result<bool>;

    /// Delete a record. Returns false if it did not exist.
    fn delete(&self, id: MessageId) -> Result<bool>;

    /// Whether the record table has the given column.
    fn has_column(&self, column: &str) -> Result<bool>;
}

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Open an existing database or create a new one with the current schema.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = sqlite_persistence::open_versioned(
            db_path,
            MMS_NOTIFICATIONS_VERSIONED_SCHEMAS,
            "mms notifications",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store, mostly for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = sqlite_persistence::open_in_memory(MMS_NOTIFICATIONS_VERSIONED_SCHEMAS)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn insert(&self, record: &MessageRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        conn.execute(
            r#"INSERT INTO mms_notifications (id, status, expiry, subject, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![
                record.id,
                record.status,
                record.expiry,
                record.subject,
                chrono::Utc::now().timestamp(),
            ],
        )
        .with_context(|| format!("Failed to insert message record {}", record.id))?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<MessageRecord> {
        Ok(MessageRecord {
            id: row.get("id")?,
            status: row.get("status")?,
            expiry: row.get("expiry")?,
            subject: row.get("subject")?,
        })
    }
}

impl RecordStore for SqliteRecordStore {
    fn load(&self, id: MessageId) -> Result<Option<MessageRecord>> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let record = conn
            .query_row(
                "SELECT id, status, expiry, subject FROM mms_notifications WHERE id = ?1",
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn update_status(&self, id: MessageId, status: i32) -> Result<bool> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let updated = conn.execute(
            "UPDATE mms_notifications SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;
        Ok(updated > 0)
    }

    fn delete(&self, id: MessageId) -> Result<bool> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let deleted = conn.execute("DELETE FROM mms_notifications WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn has_column(&self, column: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        sqlite_persistence::table_has_column(&conn, MMS_NOTIFICATIONS_TABLE, column)
    }
}
