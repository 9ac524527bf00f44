//! Statistics generation from the document store
//!
//! This module provides functionality for extracting and displaying
//! store statistics from the storage layer.

use crate::storage::Storage;
use crate::SyncError;

/// Store statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Total number of stored items
    pub items: u64,

    /// Fetched chapters across all items
    pub chapters: u64,

    /// Episode index entries across all items
    pub episodes: u64,

    /// Paths of items with listed episodes that have no fetched chapter
    pub incomplete_items: Vec<String>,
}

impl StoreStatistics {
    /// Episodes listed but never fetched (dropped or failed chapters)
    pub fn missing_chapters(&self) -> u64 {
        self.episodes.saturating_sub(self.chapters)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(SyncError)` - Failed to read the store
pub fn load_statistics(storage: &dyn Storage) -> Result<StoreStatistics, SyncError> {
    let items = storage.count_items()?;
    let mut stats = StoreStatistics {
        items,
        ..Default::default()
    };

    for record in storage.list_items()? {
        let chapters = record.chapters.len() as u64;
        let episodes = record.episodes().len() as u64;

        stats.chapters += chapters;
        stats.episodes += episodes;
        if chapters < episodes {
            stats.incomplete_items.push(record.item_path);
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Store Statistics ===\n");

    println!("Overview:");
    println!("  Items stored: {}", stats.items);
    println!("  Chapters fetched: {}", stats.chapters);
    println!("  Episodes listed: {}", stats.episodes);
    println!();

    if !stats.incomplete_items.is_empty() {
        println!(
            "Items Missing Chapters ({}):",
            stats.incomplete_items.len()
        );
        for path in &stats.incomplete_items {
            println!("  - {}", path);
        }
        println!();
    }

    let coverage = if stats.episodes > 0 {
        (stats.chapters.min(stats.episodes) as f64 / stats.episodes as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Coverage: {:.1}% ({} episodes without a chapter)",
        coverage,
        stats.missing_chapters()
    );
}
