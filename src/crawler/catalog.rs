//! Catalog crawler
//!
//! Walks an inclusive range of listing pages, one page and one item at a
//! time, and stores every item not already known. Pages and items that fail
//! are logged and counted, including store failures on a single item; a
//! failure never ends the run.

use crate::crawler::pipeline::ItemPipeline;
use crate::storage::{Storage, StorageError};
use crate::url::item_path;
use crate::Result;

/// What a discovery run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub pages_fetched: u32,
    pub pages_failed: u32,
    pub items_seen: u32,

    /// Paths of newly inserted items
    pub inserted: Vec<String>,

    /// Items already in the store
    pub skipped_existing: u32,

    /// Items whose pipeline or store access failed
    pub failed_items: u32,

    /// Paths rejected by the store as duplicates
    pub conflicts: Vec<String>,
}

/// Crawls listing pages `start..=end` and inserts unseen items
///
/// Re-running over an unchanged range inserts nothing.
pub async fn discover<S: Storage>(
    pipeline: &ItemPipeline,
    store: &mut S,
    start: u32,
    end: u32,
) -> Result<DiscoveryReport> {
    let mut report = DiscoveryReport::default();

    if start > end {
        tracing::warn!("Empty page range {}..={}, nothing to crawl", start, end);
        return Ok(report);
    }

    for page in start..=end {
        let urls = match pipeline.fetch_listing(page).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!("Skipping listing page {}: {}", page, e);
                report.pages_failed += 1;
                continue;
            }
        };

        report.pages_fetched += 1;
        tracing::info!("Listing page {}: {} items", page, urls.len());

        for url in urls {
            report.items_seen += 1;

            let path = match item_path(&url) {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!("Skipping item {}: {}", url, e);
                    report.failed_items += 1;
                    continue;
                }
            };

            match store.find_item(&path) {
                Ok(Some(_)) => {
                    tracing::debug!("Already stored: {}", path);
                    report.skipped_existing += 1;
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Skipping item {}: cannot read stored copy: {}", path, e);
                    report.failed_items += 1;
                    continue;
                }
            }

            let record = match pipeline.fetch_item(&url).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!("Skipping item {}: {}", url, e);
                    report.failed_items += 1;
                    continue;
                }
            };

            match store.insert_item(&record) {
                Ok(()) => {
                    tracing::info!(
                        "Stored '{}' ({} chapters)",
                        record.title(),
                        record.chapters.len()
                    );
                    report.inserted.push(record.item_path);
                }
                Err(StorageError::Conflict(path)) => {
                    tracing::warn!("Item already stored by another writer: {}", path);
                    report.conflicts.push(path);
                }
                Err(e) => {
                    tracing::warn!("Failed to store {}: {}", record.item_path, e);
                    report.failed_items += 1;
                }
            }
        }
    }

    tracing::info!(
        "Discovery finished: {} pages ({} failed), {} inserted, {} already stored, {} items failed",
        report.pages_fetched + report.pages_failed,
        report.pages_failed,
        report.inserted.len(),
        report.skipped_existing,
        report.failed_items
    );

    Ok(report)
}
