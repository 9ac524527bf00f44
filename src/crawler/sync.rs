//! Sync engine
//!
//! Re-checks every stored item for newly published chapters. Only chapters
//! whose key is missing from the stored episode index are fetched, and the
//! stored document only ever gains entries.
//!
//! Each item walks the refresh state machine:
//!
//! ```text
//! FetchingDetail -> Diffing -> NoOp
//!                           -> FetchingNewChapters -> Merging -> Persisted
//! FetchingDetail -> SkippedError
//! ```

use crate::crawler::pipeline::ItemPipeline;
use crate::model::{is_sorted_descending, sort_descending, Chapter, EpisodeIndex, ItemRecord};
use crate::state::RefreshState;
use crate::storage::Storage;
use crate::{Result, SyncError};

/// Keys present in the live index but not in the stored one
pub fn diff_episodes(live: &EpisodeIndex, stored: &EpisodeIndex) -> EpisodeIndex {
    live.difference(stored)
}

/// Prepends newly fetched chapters (highest first) to the stored list
///
/// The stored list keeps its order. If the result is not descending, for
/// example because a stored chapter outranks a new one, the combined list is
/// stably re-sorted.
pub fn merge_chapters(mut new: Vec<Chapter>, existing: &[Chapter]) -> Vec<Chapter> {
    sort_descending(&mut new);

    let mut merged = new;
    merged.extend_from_slice(existing);

    if !is_sorted_descending(&merged) {
        tracing::warn!("Merged chapter list out of order, re-sorting");
        sort_descending(&mut merged);
    }

    merged
}

/// Outcome of refreshing one stored item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRefresh {
    pub item_path: String,
    pub state: RefreshState,
    pub new_episodes: usize,
    pub new_chapters: usize,
    pub error: Option<String>,
}

/// Outcome of a refresh run, one entry per stored item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub items: Vec<ItemRefresh>,
}

impl RefreshReport {
    pub fn count(&self, state: RefreshState) -> usize {
        self.items.iter().filter(|i| i.state == state).count()
    }

    pub fn new_chapters(&self) -> usize {
        self.items.iter().map(|i| i.new_chapters).sum()
    }

    /// Items that ended with an error, in any state
    pub fn failed(&self) -> usize {
        self.items.iter().filter(|i| i.error.is_some()).count()
    }
}

/// Tracks one item through the refresh state machine
struct RefreshTracker {
    item_path: String,
    state: RefreshState,
}

impl RefreshTracker {
    fn new(item_path: &str) -> Self {
        Self {
            item_path: item_path.to_string(),
            state: RefreshState::FetchingDetail,
        }
    }

    fn advance(&mut self, next: RefreshState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(SyncError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{}: {} -> {}", self.item_path, self.state, next);
        self.state = next;
        Ok(())
    }

    fn finish(self, new_episodes: usize, new_chapters: usize, error: Option<String>) -> ItemRefresh {
        ItemRefresh {
            item_path: self.item_path,
            state: self.state,
            new_episodes,
            new_chapters,
            error,
        }
    }
}

/// Refreshes one stored item
///
/// A detail page that cannot be fetched or parsed ends in `SkippedError`.
/// A failed store write leaves the item in `Merging` with the error recorded;
/// the stored document is unchanged. Only an illegal state transition is
/// returned as an error.
pub async fn refresh_item<S: Storage>(
    pipeline: &ItemPipeline,
    store: &mut S,
    record: ItemRecord,
) -> Result<ItemRefresh> {
    let mut tracker = RefreshTracker::new(&record.item_path);

    let live = match pipeline.item_url(&record.item_path) {
        Ok(url) => pipeline.fetch_detail(&url).await,
        Err(e) => Err(e),
    };
    let live = match live {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!("Skipping refresh of {}: {}", record.item_path, e);
            tracker.advance(RefreshState::SkippedError)?;
            return Ok(tracker.finish(0, 0, Some(e.to_string())));
        }
    };

    tracker.advance(RefreshState::Diffing)?;
    let new = diff_episodes(&live.episodes, &record.detail.episodes);
    if new.is_empty() {
        tracker.advance(RefreshState::NoOp)?;
        tracing::debug!("'{}' is up to date", record.title());
        return Ok(tracker.finish(0, 0, None));
    }

    tracker.advance(RefreshState::FetchingNewChapters)?;
    tracing::info!("'{}': {} new episodes", record.title(), new.len());
    let fetched = pipeline.pool().fetch_all(new.keys(), &new).await;
    let new_chapters = fetched.len();

    tracker.advance(RefreshState::Merging)?;
    let mut updated = record;
    updated.chapters = merge_chapters(fetched, &updated.chapters);
    updated.detail.episodes = updated.detail.episodes.merged_with(&new);

    if let Err(e) = store.update_item(&updated) {
        tracing::warn!("Failed to persist {}: {}", updated.item_path, e);
        return Ok(tracker.finish(new.len(), 0, Some(e.to_string())));
    }
    tracker.advance(RefreshState::Persisted)?;

    Ok(tracker.finish(new.len(), new_chapters, None))
}

/// Outcome for an item that failed outside the normal state walk
fn skipped_entry(item_path: String, error: String) -> ItemRefresh {
    ItemRefresh {
        item_path,
        state: RefreshState::SkippedError,
        new_episodes: 0,
        new_chapters: 0,
        error: Some(error),
    }
}

/// Refreshes every stored item in key order
///
/// Each document is loaded on its own, so one unreadable or unwritable item
/// is reported in its entry and the rest still run.
pub async fn refresh_all<S: Storage>(pipeline: &ItemPipeline, store: &mut S) -> Result<RefreshReport> {
    let paths = store.list_item_paths()?;
    tracing::info!("Refreshing {} stored items", paths.len());

    let mut report = RefreshReport::default();
    for path in paths {
        let record = match store.find_item(&path) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("{} removed during refresh", path);
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping refresh of {}: {}", path, e);
                report.items.push(skipped_entry(path, e.to_string()));
                continue;
            }
        };

        let outcome = match refresh_item(pipeline, store, record).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Refresh of {} aborted: {}", path, e);
                skipped_entry(path, e.to_string())
            }
        };
        report.items.push(outcome);
    }

    tracing::info!(
        "Refresh finished: {} updated, {} unchanged, {} skipped, {} failed, {} new chapters",
        report.count(RefreshState::Persisted),
        report.count(RefreshState::NoOp),
        report.count(RefreshState::SkippedError),
        report.failed(),
        report.new_chapters()
    );

    Ok(report)
}
