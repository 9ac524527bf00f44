//! Chapter fetch pool
//!
//! Fetches and parses a batch of chapters for one item concurrently. Every
//! chapter is its own task; a semaphore caps how many are in flight. A chapter
//! that cannot be fetched, parsed, or numbered contributes nothing and never
//! aborts the batch.

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::{PageParser, ParseError};
use crate::model::{extract_ordinal, sort_descending, Chapter, EpisodeIndex};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Why one chapter produced no record
#[derive(Debug, Error)]
pub enum ChapterError {
    #[error("no chapter number in '{0}'")]
    NoOrdinal(String),

    #[error("'{0}' is not in the episode index")]
    NotIndexed(String),

    #[error("invalid chapter URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unavailable after {attempts} attempt(s): {url}")]
    Unavailable { url: String, attempts: u32 },

    #[error("cannot extract {url}: {source}")]
    Parse { url: String, source: ParseError },

    #[error("fetch pool closed")]
    PoolClosed,
}

/// Bounded concurrent chapter fetcher
#[derive(Clone)]
pub struct ChapterFetchPool {
    fetcher: Fetcher,
    parser: Arc<dyn PageParser>,
    base_url: Url,
    max_in_flight: usize,
}

impl ChapterFetchPool {
    /// Creates a pool
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Shared fetcher (clones share its throttle)
    /// * `parser` - Extracts image paths from chapter pages
    /// * `base_url` - Site base that chapter paths are joined onto
    /// * `max_in_flight` - Upper bound on simultaneous chapter fetches
    pub fn new(
        fetcher: Fetcher,
        parser: Arc<dyn PageParser>,
        base_url: Url,
        max_in_flight: usize,
    ) -> Self {
        Self {
            fetcher,
            parser,
            base_url,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Fetches every named chapter and returns the successes, highest ordinal first
    ///
    /// `names` are looked up in `index` to find each chapter's path.
    pub async fn fetch_all<I, S>(&self, names: I, index: &EpisodeIndex) -> Vec<Chapter>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();

        for name in names {
            let name = name.as_ref().to_string();
            let path = index.get(&name).map(str::to_string);
            let pool = self.clone();
            let semaphore = Arc::clone(&semaphore);

            tasks.spawn(async move {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => pool.fetch_resolved(&name, path.as_deref()).await,
                    Err(_) => Err(ChapterError::PoolClosed),
                };
                (name, result)
            });
        }

        let mut chapters = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(chapter))) => {
                    tracing::debug!("Downloaded {} ({} images)", name, chapter.images.len());
                    chapters.push(chapter);
                }
                Ok((name, Err(ChapterError::NoOrdinal(_)))) => {
                    tracing::debug!("Dropping {}: no integer chapter number", name);
                }
                Ok((name, Err(e))) => {
                    tracing::warn!("Skipping {}: {}", name, e);
                }
                Err(e) => {
                    tracing::error!("Chapter task failed: {}", e);
                }
            }
        }

        sort_descending(&mut chapters);
        chapters
    }

    /// Fetches a single chapter by display name
    pub async fn fetch_one(&self, name: &str, index: &EpisodeIndex) -> Result<Chapter, ChapterError> {
        self.fetch_resolved(name, index.get(name)).await
    }

    async fn fetch_resolved(&self, name: &str, path: Option<&str>) -> Result<Chapter, ChapterError> {
        let ordinal = extract_ordinal(name).ok_or_else(|| ChapterError::NoOrdinal(name.to_string()))?;
        let path = path.ok_or_else(|| ChapterError::NotIndexed(name.to_string()))?;
        let url = crate::url::site_url(&self.base_url, path)?;

        let body = match self.fetcher.fetch(url.as_str()).await {
            FetchResult::Success { body, .. } => body,
            FetchResult::Unavailable { url, attempts, .. } => {
                return Err(ChapterError::Unavailable { url, attempts })
            }
        };

        let images = self
            .parser
            .parse_chapter_images(&body, &url)
            .map_err(|source| ChapterError::Parse {
                url: url.to_string(),
                source,
            })?;

        Ok(Chapter::new(ordinal, images))
    }
}
