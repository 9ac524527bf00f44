//! Output module for presenting operation results
//!
//! This module handles:
//! - Summaries of discovery and refresh runs
//! - Pretty-printed JSON for fetched items and chapters
//! - Store statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::crawler::{DiscoveryReport, RefreshReport};
use crate::model::{Chapter, ItemRecord};
use crate::state::RefreshState;

/// Formats a discovery run summary
pub fn format_discovery(report: &DiscoveryReport) -> String {
    let mut out = String::new();
    out.push_str("=== Discovery ===\n\n");
    out.push_str(&format!(
        "Pages: {} fetched, {} failed\n",
        report.pages_fetched, report.pages_failed
    ));
    out.push_str(&format!("Items seen: {}\n", report.items_seen));
    out.push_str(&format!("  Inserted: {}\n", report.inserted.len()));
    out.push_str(&format!("  Already stored: {}\n", report.skipped_existing));
    out.push_str(&format!("  Failed: {}\n", report.failed_items));

    if !report.inserted.is_empty() {
        out.push_str("\nNew items:\n");
        for path in &report.inserted {
            out.push_str(&format!("  - {}\n", path));
        }
    }

    if !report.conflicts.is_empty() {
        out.push_str("\nDuplicate inserts rejected:\n");
        for path in &report.conflicts {
            out.push_str(&format!("  - {}\n", path));
        }
    }

    out
}

/// Formats a refresh run summary
pub fn format_refresh(report: &RefreshReport) -> String {
    let mut out = String::new();
    out.push_str("=== Refresh ===\n\n");
    out.push_str(&format!("Items checked: {}\n", report.items.len()));
    out.push_str(&format!("  Updated: {}\n", report.count(RefreshState::Persisted)));
    out.push_str(&format!("  Unchanged: {}\n", report.count(RefreshState::NoOp)));
    out.push_str(&format!("  Skipped: {}\n", report.count(RefreshState::SkippedError)));
    out.push_str(&format!("  Failed: {}\n", report.failed()));
    out.push_str(&format!("New chapters: {}\n", report.new_chapters()));

    let updated: Vec<_> = report
        .items
        .iter()
        .filter(|i| i.state == RefreshState::Persisted)
        .collect();
    if !updated.is_empty() {
        out.push_str("\nUpdated items:\n");
        for item in updated {
            out.push_str(&format!(
                "  - {} (+{} chapters, +{} episodes)\n",
                item.item_path, item.new_chapters, item.new_episodes
            ));
        }
    }

    let failed: Vec<_> = report.items.iter().filter(|i| i.error.is_some()).collect();
    if !failed.is_empty() {
        out.push_str("\nSkipped or failed items:\n");
        for item in failed {
            out.push_str(&format!(
                "  - {} [{}]: {}\n",
                item.item_path,
                item.state,
                item.error.as_deref().unwrap_or_default()
            ));
        }
    }

    out
}

pub fn print_discovery(report: &DiscoveryReport) {
    print!("{}", format_discovery(report));
}

pub fn print_refresh(report: &RefreshReport) {
    print!("{}", format_refresh(report));
}

/// Prints an item document as pretty JSON
pub fn print_item(record: &ItemRecord) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(record)?);
    Ok(())
}

/// Prints a chapter as pretty JSON
pub fn print_chapter(chapter: &Chapter) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(chapter)?);
    Ok(())
}
