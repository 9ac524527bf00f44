//! Comic-Sync: incremental catalog crawler
//!
//! This crate crawls a paginated comic catalog, extracts item and chapter
//! records, and keeps a document store in step with newly published chapters
//! without downloading anything twice.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Comic-Sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unavailable after {attempts} attempt(s): {url}")]
    Unavailable { url: String, attempts: u32 },

    #[error("Cannot extract page {url}: {source}")]
    Parse {
        url: String,
        source: crawler::ParseError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid refresh transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RefreshState,
        to: state::RefreshState,
    },

    #[error("Episode '{name}' not listed for {item_path}")]
    EpisodeNotFound { item_path: String, name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Comic-Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, Operation, Outcome};
pub use model::{Chapter, EpisodeIndex, ItemDetail, ItemRecord};
pub use state::RefreshState;
