//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! Item detail and chapter lists are stored as JSON text columns.

use crate::model::{Chapter, ItemDetail, ItemRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;

/// SQLite document store
pub struct SqliteStorage {
    conn: Connection,
    collection: String,
}

impl SqliteStorage {
    /// Opens or creates a database file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `collection` - Table holding item documents (a validated identifier)
    pub fn open(path: &Path, collection: &str) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn, collection)?;

        Ok(Self {
            conn,
            collection: collection.to_string(),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory(collection: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn, collection)?;
        Ok(Self {
            conn,
            collection: collection.to_string(),
        })
    }

    fn select_sql(&self, filter: &str) -> String {
        format!(
            "SELECT item_path, detail, chapters FROM {} {}",
            self.collection, filter
        )
    }
}

/// Raw columns of one row; decoded outside the rusqlite closure so JSON
/// errors keep their own type.
struct RawItem {
    item_path: String,
    detail: String,
    chapters: String,
}

impl RawItem {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            item_path: row.get(0)?,
            detail: row.get(1)?,
            chapters: row.get(2)?,
        })
    }

    fn decode(self) -> StorageResult<ItemRecord> {
        let detail: ItemDetail = serde_json::from_str(&self.detail)?;
        let chapters: Vec<Chapter> = serde_json::from_str(&self.chapters)?;
        Ok(ItemRecord::new(self.item_path, detail, chapters))
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl Storage for SqliteStorage {
    fn find_item(&self, item_path: &str) -> StorageResult<Option<ItemRecord>> {
        let mut stmt = self.conn.prepare(&self.select_sql("WHERE item_path = ?1"))?;

        let raw = stmt
            .query_row(params![item_path], RawItem::from_row)
            .optional()?;

        raw.map(RawItem::decode).transpose()
    }

    fn list_items(&self) -> StorageResult<Vec<ItemRecord>> {
        let mut stmt = self.conn.prepare(&self.select_sql("ORDER BY item_path"))?;

        let raws = stmt
            .query_map([], RawItem::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(raws.len());
        for raw in raws {
            let item_path = raw.item_path.clone();
            match raw.decode() {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping undecodable item {}: {}", item_path, e),
            }
        }

        Ok(records)
    }

    fn list_item_paths(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT item_path FROM {} ORDER BY item_path", self.collection))?;

        let paths = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(paths)
    }

    fn insert_item(&mut self, record: &ItemRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let detail = serde_json::to_string(&record.detail)?;
        let chapters = serde_json::to_string(&record.chapters)?;

        let sql = format!(
            "INSERT INTO {} (item_path, title, detail, chapters, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            self.collection
        );

        self.conn
            .execute(
                &sql,
                params![record.item_path, record.detail.title, detail, chapters, now],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StorageError::Conflict(record.item_path.clone())
                } else {
                    StorageError::Sqlite(e)
                }
            })?;

        Ok(())
    }

    fn update_item(&mut self, record: &ItemRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let detail = serde_json::to_string(&record.detail)?;
        let chapters = serde_json::to_string(&record.chapters)?;

        let sql = format!(
            "UPDATE {} SET title = ?1, detail = ?2, chapters = ?3, updated_at = ?4
             WHERE item_path = ?5",
            self.collection
        );

        let updated = self.conn.execute(
            &sql,
            params![record.detail.title, detail, chapters, now, record.item_path],
        )?;

        if updated == 0 {
            return Err(StorageError::NotFound(record.item_path.clone()));
        }

        Ok(())
    }

    fn count_items(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.collection),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }
}
