//! Configuration module for Comic-Sync
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use comic_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("comic-sync.toml")).unwrap();
//! println!("Crawling {}", config.site.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetcherConfig, PoolConfig, RenderConfig, SiteConfig, StoreConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash, ENV_BASE_URL,
    ENV_RENDER_KEY, ENV_STORE_PATH,
};
pub use validation::validate;
