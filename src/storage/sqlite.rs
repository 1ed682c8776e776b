//! SQLite storage backend for the review table and integration ledger.

use super::traits::{StateStore, StorageError, StorageResult};
use crate::integration::{IntegrationId, IntegrationRecord};
use crate::review::{ReviewId, ReviewItem};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed store.
///
/// Records are serialized to JSON in a payload column; the few columns the
/// store queries on (status, creation time) are materialized alongside.
/// Thread-safe via an internal mutex on the connection, which also makes
/// `update_review` atomic per call.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, useful for testing.
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS review_items (
                id TEXT PRIMARY KEY,
                status TEXT NOT NULL,
                priority TEXT NOT NULL,
                created_at TEXT NOT NULL,
                payload_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_review_status
                ON review_items(status);

            CREATE TABLE IF NOT EXISTS integration_records (
                id TEXT PRIMARY KEY,
                target_location TEXT NOT NULL,
                integrated_at TEXT NOT NULL,
                payload_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_records_target
                ON integration_records(target_location);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn write_review(conn: &Connection, item: &ReviewItem) -> StorageResult<()> {
        let payload = serde_json::to_string(item)?;
        conn.execute(
            "INSERT OR REPLACE INTO review_items (id, status, priority, created_at, payload_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                item.id.to_string(),
                item.status.to_string(),
                item.priority.to_string(),
                item.created_at.to_rfc3339(),
                payload,
            ],
        )?;
        Ok(())
    }

    fn read_review(conn: &Connection, id: &ReviewId) -> StorageResult<Option<ReviewItem>> {
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM review_items WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write_record(conn: &Connection, record: &IntegrationRecord) -> StorageResult<()> {
        let payload = serde_json::to_string(record)?;
        conn.execute(
            "INSERT OR REPLACE INTO integration_records (id, target_location, integrated_at, payload_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.id.to_string(),
                record.target_location,
                record.integrated_at.to_rfc3339(),
                payload,
            ],
        )?;
        Ok(())
    }

    fn read_record(conn: &Connection, id: &IntegrationId) -> StorageResult<Option<IntegrationRecord>> {
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload_json FROM integration_records WHERE id = ?1",
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

impl StateStore for SqliteStore {
    fn put_review(&self, item: &ReviewItem) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        Self::write_review(&conn, item)
    }

    fn get_review(&self, id: &ReviewId) -> StorageResult<Option<ReviewItem>> {
        let conn = self.conn.lock().unwrap();
        Self::read_review(&conn, id)
    }

    fn list_reviews(&self) -> StorageResult<Vec<ReviewItem>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT payload_json FROM review_items")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut items = Vec::new();
        for row in rows {
            items.push(serde_json::from_str(&row?)?);
        }
        Ok(items)
    }

    fn delete_review(&self, id: &ReviewId) -> StorageResult<bool> {
        let conn = self.conn.lock().unwrap();
        let affected = conn.execute(
            "DELETE FROM review_items WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(affected > 0)
    }

    fn update_review(
        &self,
        id: &ReviewId,
        apply: &mut dyn FnMut(&mut ReviewItem) -> Result<(), String>,
    ) -> StorageResult<ReviewItem> {
        // The connection mutex spans read-modify-write, so concurrent
        // updates to the same id serialize here.
        let conn = self.conn.lock().unwrap();
        let mut item = Self::read_review(&conn, id)?
            .ok_or_else(|| StorageError::ReviewNotFound(id.to_string()))?;
        apply(&mut item).map_err(StorageError::Conflict)?;
        Self::write_review(&conn, &item)?;
        Ok(item)
    }

    fn put_record(&self, record: &IntegrationRecord) -> StorageResult<()> {
        let conn = self.conn.lock().unwrap();
        Self::write_record(&conn, record)
    }

    fn get_record(&self, id: &IntegrationId) -> StorageResult<Option<IntegrationRecord>> {
        let conn = self.conn.lock().unwrap();
        Self::read_record(&conn, id)
    }

    fn list_records(&self) -> StorageResult<Vec<IntegrationRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT payload_json FROM integration_records")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    fn update_record(
        &self,
        id: &IntegrationId,
        apply: &mut dyn FnMut(&mut IntegrationRecord) -> Result<(), String>,
    ) -> StorageResult<IntegrationRecord> {
        let conn = self.conn.lock().unwrap();
        let mut record = Self::read_record(&conn, id)?
            .ok_or_else(|| StorageError::RecordNotFound(id.to_string()))?;
        apply(&mut record).map_err(StorageError::Conflict)?;
        Self::write_record(&conn, &record)?;
        Ok(record)
    }
}
