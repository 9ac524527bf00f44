//! Storage module for persisting item documents
//!
//! This module handles all document store operations, including:
//! - SQLite database initialization and schema management
//! - Find-by-path, find-all, insert-one and update-one for item documents
//! - Explicit open/close lifecycle owned by the caller

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::config::StoreConfig;
use crate::SyncError;
use std::path::Path;

/// Opens the document store described by the configuration
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully opened storage
/// * `Err(SyncError)` - Failed to open the database or create the schema
pub fn open_storage(config: &StoreConfig) -> Result<SqliteStorage, SyncError> {
    Ok(SqliteStorage::open(Path::new(&config.path), &config.collection)?)
}
