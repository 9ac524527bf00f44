//! Crawler coordinator - operation dispatch
//!
//! The coordinator owns everything an operation needs: configuration, the
//! fetch/parse pipeline and the document store. The store is opened by the
//! caller, handed in at construction, and closed by `shutdown`.
//!
//! | Operation | Store access | Result |
//! |-----------|--------------|--------|
//! | `Discover` | read + insert | `Outcome::Discovery` |
//! | `FetchOne` | insert only with `save` | `Outcome::Item` |
//! | `FetchChapter` | none | `Outcome::Chapter` |
//! | `RefreshAll` | read + update | `Outcome::Refresh` |
//! | `Stats` | read | `Outcome::Stats` |

use crate::config::Config;
use crate::crawler::catalog::{self, DiscoveryReport};
use crate::crawler::parser::{HtmlPageParser, PageParser};
use crate::crawler::pipeline::ItemPipeline;
use crate::crawler::sync::{self, RefreshReport};
use crate::model::{Chapter, ItemRecord};
use crate::output::{load_statistics, StoreStatistics};
use crate::storage::Storage;
use crate::Result;
use std::sync::Arc;

/// A unit of work requested by the driving shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Crawl listing pages `start..=end` and store unseen items
    Discover { start: u32, end: u32 },

    /// Fetch one item's detail and chapters, optionally inserting it
    FetchOne { url: String, save: bool },

    /// Fetch a single numbered chapter of an item
    FetchChapter { url: String, number: u64 },

    /// Pull new chapters for every stored item
    RefreshAll,

    /// Summarize the store
    Stats,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Discover { .. } => "discover",
            Self::FetchOne { .. } => "fetch-one",
            Self::FetchChapter { .. } => "fetch-chapter",
            Self::RefreshAll => "refresh",
            Self::Stats => "stats",
        }
    }
}

/// Result of a dispatched operation
#[derive(Debug, Clone)]
pub enum Outcome {
    Discovery(DiscoveryReport),
    Item { record: ItemRecord, saved: bool },
    Chapter(Chapter),
    Refresh(RefreshReport),
    Stats(StoreStatistics),
}

/// Main coordinator structure
pub struct Coordinator<S: Storage> {
    config: Arc<Config>,
    pipeline: ItemPipeline,
    store: S,
}

impl<S: Storage> Coordinator<S> {
    /// Creates a coordinator using the site's HTML parser
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    /// * `store` - Opened document store; owned until `shutdown`
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SyncError)` - Invalid base URL or HTTP client setup failure
    pub fn new(config: Config, store: S) -> Result<Self> {
        Self::with_parser(config, store, Arc::new(HtmlPageParser::new()))
    }

    /// Creates a coordinator with a custom page parser
    pub fn with_parser(config: Config, store: S, parser: Arc<dyn PageParser>) -> Result<Self> {
        let pipeline = ItemPipeline::new(&config, parser)?;
        Ok(Self {
            config: Arc::new(config),
            pipeline,
            store,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs discovery over listing pages `start..=end`
    pub async fn discover_and_sync(&mut self, start: u32, end: u32) -> Result<DiscoveryReport> {
        catalog::discover(&self.pipeline, &mut self.store, start, end).await
    }

    /// Fetches one item's full record without touching the store
    pub async fn fetch_one(&self, url: &str) -> Result<ItemRecord> {
        self.pipeline.fetch_item(url).await
    }

    /// Fetches one item and inserts it
    ///
    /// Fails with a storage conflict if the item is already stored.
    pub async fn fetch_and_save(&mut self, url: &str) -> Result<ItemRecord> {
        let record = self.pipeline.fetch_item(url).await?;
        self.store.insert_item(&record)?;
        tracing::info!("Stored '{}'", record.title());
        Ok(record)
    }

    /// Fetches chapter `number` of an item without touching the store
    pub async fn fetch_chapter(&self, url: &str, number: u64) -> Result<Chapter> {
        self.pipeline.fetch_chapter(url, number).await
    }

    /// Refreshes every stored item
    pub async fn refresh_all(&mut self) -> Result<RefreshReport> {
        sync::refresh_all(&self.pipeline, &mut self.store).await
    }

    pub fn stats(&self) -> Result<StoreStatistics> {
        load_statistics(&self.store)
    }

    /// Runs one operation
    pub async fn dispatch(&mut self, operation: Operation) -> Result<Outcome> {
        tracing::debug!("Dispatching {}", operation.name());

        match operation {
            Operation::Discover { start, end } => self
                .discover_and_sync(start, end)
                .await
                .map(Outcome::Discovery),
            Operation::FetchOne { url, save } => {
                let record = if save {
                    self.fetch_and_save(&url).await?
                } else {
                    self.fetch_one(&url).await?
                };
                Ok(Outcome::Item {
                    record,
                    saved: save,
                })
            }
            Operation::FetchChapter { url, number } => {
                self.fetch_chapter(&url, number).await.map(Outcome::Chapter)
            }
            Operation::RefreshAll => self.refresh_all().await.map(Outcome::Refresh),
            Operation::Stats => self.stats().map(Outcome::Stats),
        }
    }

    /// Releases the store
    pub fn shutdown(self) -> Result<()> {
        self.store.close()?;
        tracing::debug!("Store closed");
        Ok(())
    }
}
