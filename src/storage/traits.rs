//! Storage traits and error types
//!
//! This module defines the trait interface for document store backends and
//! associated error types.

use crate::model::ItemRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Item already stored: {0}")]
    Conflict(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Keyed document storage for items
///
/// Documents are keyed uniquely by item path. Every write is atomic per
/// document; there is no concurrency control across read-modify-write
/// sequences, so the last writer wins.
pub trait Storage {
    /// Finds an item by its site path
    fn find_item(&self, item_path: &str) -> StorageResult<Option<ItemRecord>>;

    /// Returns every stored item that decodes, ordered by path
    ///
    /// Documents that cannot be decoded are logged and left out.
    fn list_items(&self) -> StorageResult<Vec<ItemRecord>>;

    /// Returns every stored key, ordered by path, without decoding documents
    fn list_item_paths(&self) -> StorageResult<Vec<String>>;

    /// Inserts a new item
    ///
    /// Fails with `StorageError::Conflict` if the path is already stored.
    fn insert_item(&mut self, record: &ItemRecord) -> StorageResult<()>;

    /// Replaces the detail and chapter list of an existing item
    ///
    /// Callers pass the already-merged document. Fails with
    /// `StorageError::NotFound` if the path is not stored.
    fn update_item(&mut self, record: &ItemRecord) -> StorageResult<()>;

    /// Counts stored items
    fn count_items(&self) -> StorageResult<u64>;

    /// Flushes and releases the backend
    fn close(self) -> StorageResult<()>
    where
        Self: Sized;
}
