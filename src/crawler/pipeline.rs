//! Item pipeline: detail page, then every chapter
//!
//! Shared by discovery, single-item fetches and refresh. Nothing here touches
//! the store.

use crate::config::{Config, SiteConfig};
use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::PageParser;
use crate::crawler::pool::{ChapterError, ChapterFetchPool};
use crate::model::{Chapter, ItemDetail, ItemRecord};
use crate::url::{item_path, listing_url, site_url};
use crate::{Result, SyncError};
use std::sync::Arc;
use url::Url;

#[derive(Clone)]
pub struct ItemPipeline {
    fetcher: Fetcher,
    parser: Arc<dyn PageParser>,
    pool: ChapterFetchPool,
    site: SiteConfig,
    base_url: Url,
}

impl ItemPipeline {
    /// Builds the fetcher, pool and parser stack from configuration
    pub fn new(config: &Config, parser: Arc<dyn PageParser>) -> Result<Self> {
        let base_url = Url::parse(&config.site.base_url)?;
        let fetcher = Fetcher::new(&config.fetcher, config.render.clone())?;
        let pool = ChapterFetchPool::new(
            fetcher.clone(),
            Arc::clone(&parser),
            base_url.clone(),
            config.pool.max_in_flight,
        );

        Ok(Self {
            fetcher,
            parser,
            pool,
            site: config.site.clone(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn pool(&self) -> &ChapterFetchPool {
        &self.pool
    }

    /// Absolute URL of a stored item path
    pub fn item_url(&self, item_path: &str) -> Result<Url> {
        Ok(site_url(&self.base_url, item_path)?)
    }

    /// Fetches and parses an item's detail page
    pub async fn fetch_detail(&self, url: &Url) -> Result<ItemDetail> {
        let body = fetch_body(self.fetcher.fetch(url.as_str()).await)?;
        self.parser
            .parse_detail(&body, url)
            .map_err(|source| SyncError::Parse {
                url: url.to_string(),
                source,
            })
    }

    /// Runs the full detail + chapters pipeline for one item
    pub async fn fetch_item(&self, url: &str) -> Result<ItemRecord> {
        let url = Url::parse(url.trim())?;
        let path = item_path(url.as_str())?;

        let detail = self.fetch_detail(&url).await?;
        tracing::info!(
            "Fetching {} chapters of '{}'",
            detail.episodes.len(),
            detail.title
        );

        let chapters = self
            .pool
            .fetch_all(detail.episodes.keys(), &detail.episodes)
            .await;

        if chapters.len() < detail.episodes.len() {
            tracing::warn!(
                "'{}': {} of {} chapters stored",
                detail.title,
                chapters.len(),
                detail.episodes.len()
            );
        }

        Ok(ItemRecord::new(path, detail, chapters))
    }

    /// Fetches one numbered chapter of an item
    pub async fn fetch_chapter(&self, url: &str, number: u64) -> Result<Chapter> {
        let url = Url::parse(url.trim())?;
        let path = item_path(url.as_str())?;
        let detail = self.fetch_detail(&url).await?;

        let name = format!("CHAPTER {}", number);
        if !detail.episodes.contains(&name) {
            return Err(SyncError::EpisodeNotFound {
                item_path: path,
                name,
            });
        }

        self.pool
            .fetch_one(&name, &detail.episodes)
            .await
            .map_err(|e| chapter_error(e, &path))
    }

    /// Fetches one listing page and returns the item URLs on it
    pub async fn fetch_listing(&self, page: u32) -> Result<Vec<String>> {
        let url = listing_url(
            &self.base_url,
            &self.site.listing_path,
            &self.site.page_param,
            page,
        )?;

        let result = if self.site.render_listings {
            self.fetcher.fetch_rendered(&url).await
        } else {
            self.fetcher.fetch(url.as_str()).await
        };
        let body = fetch_body(result)?;

        self.parser
            .parse_listing(&body, &url)
            .map_err(|source| SyncError::Parse {
                url: url.to_string(),
                source,
            })
    }
}

fn fetch_body(result: FetchResult) -> Result<String> {
    match result {
        FetchResult::Success {
            final_url,
            status_code,
            body,
        } => {
            tracing::debug!("{} {} ({} bytes)", status_code, final_url, body.len());
            Ok(body)
        }
        FetchResult::Unavailable { url, attempts, .. } => {
            Err(SyncError::Unavailable { url, attempts })
        }
    }
}

fn chapter_error(err: ChapterError, item_path: &str) -> SyncError {
    match err {
        ChapterError::NoOrdinal(name) | ChapterError::NotIndexed(name) => {
            SyncError::EpisodeNotFound {
                item_path: item_path.to_string(),
                name,
            }
        }
        ChapterError::Url(e) => SyncError::UrlParse(e),
        ChapterError::Unavailable { url, attempts } => SyncError::Unavailable { url, attempts },
        ChapterError::Parse { url, source } => SyncError::Parse { url, source },
        ChapterError::PoolClosed => {
            SyncError::Io(std::io::Error::other("chapter fetch pool closed"))
        }
    }
}
