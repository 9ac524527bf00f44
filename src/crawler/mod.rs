//! Crawler module for catalog discovery and chapter sync
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded retry and request spacing
//! - Page parsing behind the `PageParser` seam
//! - Bounded concurrent chapter fetching
//! - Catalog discovery and incremental refresh
//! - Operation dispatch

mod catalog;
mod coordinator;
mod fetcher;
mod parser;
mod pipeline;
mod pool;
mod retry;
mod sync;

pub use catalog::{discover, DiscoveryReport};
pub use coordinator::{Coordinator, Operation, Outcome};
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use parser::{HtmlPageParser, PageParser, ParseError};
pub use pipeline::ItemPipeline;
pub use pool::{ChapterError, ChapterFetchPool};
pub use retry::{Attempt, RetryError, RetryPolicy};
pub use sync::{diff_episodes, merge_chapters, refresh_all, refresh_item, ItemRefresh, RefreshReport};
