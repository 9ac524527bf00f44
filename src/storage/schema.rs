//! Database schema definitions
//!
//! Each collection is one table of JSON documents keyed by item path.

/// Builds the schema SQL for a collection
///
/// `collection` must already be validated as a plain identifier.
pub fn schema_sql(collection: &str) -> String {
    format!(
        r#"
-- One document per catalog item
CREATE TABLE IF NOT EXISTS {collection} (
    item_path TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    detail TEXT NOT NULL,
    chapters TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_{collection}_title ON {collection}(title);
"#
    )
}

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `collection` - Table name for item documents
pub fn initialize_schema(
    conn: &rusqlite::Connection,
    collection: &str,
) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&schema_sql(collection))?;
    Ok(())
}
