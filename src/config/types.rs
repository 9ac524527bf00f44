use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Comic-Sync
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub pool: PoolConfig,
    #[serde(default)]
    pub render: Option<RenderConfig>,
    pub store: StoreConfig,
}

/// Target site layout
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base domain every stored path is relative to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Listing path (with any fixed query) relative to the base URL
    #[serde(rename = "listing-path", default = "default_listing_path")]
    pub listing_path: String,

    /// Query parameter carrying the listing page number
    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,

    /// Fetch listing pages through the rendering proxy
    #[serde(rename = "render-listings", default)]
    pub render_listings: bool,
}

/// HTTP fetch behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Client identity header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Total attempts per URL, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (milliseconds)
    #[serde(rename = "base-backoff-ms", default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,

    /// Multiplier applied to the delay after each failed attempt
    #[serde(rename = "backoff-factor", default = "default_backoff_factor")]
    pub backoff_factor: u32,

    /// Minimum time between two request starts (milliseconds, 0 disables)
    #[serde(rename = "min-request-interval-ms", default)]
    pub min_request_interval_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl FetcherConfig {
    pub fn base_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
            backoff_factor: default_backoff_factor(),
            min_request_interval_ms: 0,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Chapter fetch pool sizing
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    /// Maximum chapter fetches in flight for one item
    #[serde(rename = "max-in-flight", default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Rendering proxy for listing pages that need script execution
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub endpoint: String,

    #[serde(rename = "api-key", default)]
    pub api_key: String,
}

/// Document store location
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub path: String,

    /// Table holding item documents
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_listing_path() -> String {
    "tim-truyen?status=&sort=10".to_string()
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_backoff_ms() -> u64 {
    5_000
}

fn default_backoff_factor() -> u32 {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_in_flight() -> usize {
    8
}

fn default_collection() -> String {
    "comics".to_string()
}
