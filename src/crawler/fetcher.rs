//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured client identity
//! - Spacing request starts by a minimum interval
//! - Retrying transient failures with exponential backoff
//! - Routing script-dependent pages through a rendering proxy
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Network error / timeout | Retry with backoff |
//! | HTTP 5xx | Retry with backoff |
//! | HTTP 408, 429 | Retry with backoff |
//! | Other HTTP 4xx | Give up immediately |
//!
//! Exhausting the attempts yields `FetchResult::Unavailable`, never an error.

use crate::config::{FetcherConfig, RenderConfig};
use crate::crawler::retry::{Attempt, RetryPolicy};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// Every attempt failed; callers skip this unit of work
    Unavailable {
        /// The URL that was requested
        url: String,
        /// Attempts made before giving up
        attempts: u32,
        /// Description of the last failure
        error: String,
    },
}

/// Why a single attempt failed
#[derive(Debug)]
enum FetchFailure {
    Status(StatusCode),
    Network(reqwest::Error),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP {}", status),
            Self::Network(e) if e.is_timeout() => write!(f, "request timeout"),
            Self::Network(e) if e.is_connect() => write!(f, "connection failed: {}", e),
            Self::Network(e) => write!(f, "{}", e),
        }
    }
}

/// Returns true if a non-success status is worth retrying
///
/// Client errors other than request timeout and rate limiting will not change
/// on retry.
fn is_retryable_status(status: StatusCode) -> bool {
    !status.is_client_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

/// Enforces a minimum interval between request starts across all clones
#[derive(Debug)]
struct Throttle {
    interval: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl Throttle {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: Mutex::new(None),
        }
    }

    async fn wait_turn(&self) {
        if self.interval.is_zero() {
            return;
        }

        // Held across the sleep so waiting requests queue up in order
        let mut last_start = self.last_start.lock().await;
        if let Some(last) = *last_start {
            let ready_at = last + self.interval;
            if Instant::now() < ready_at {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_start = Some(Instant::now());
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use comic_sync::config::FetcherConfig;
/// use comic_sync::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited, retrying GET client
///
/// Cheap to clone; clones share the HTTP connection pool and the throttle.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
    throttle: Arc<Throttle>,
    render: Option<RenderConfig>,
}

impl Fetcher {
    /// Creates a fetcher from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Client identity, retry and throttle settings
    /// * `render` - Rendering proxy used by `fetch_rendered`, if any
    pub fn new(config: &FetcherConfig, render: Option<RenderConfig>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            policy: RetryPolicy::from_config(config),
            throttle: Arc::new(Throttle::new(config.min_request_interval())),
            render,
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches a URL, retrying transient failures
    pub async fn fetch(&self, url: &str) -> FetchResult {
        self.fetch_with_retry(url, url).await
    }

    /// Fetches a URL through the rendering proxy so script-populated content
    /// is present in the body
    ///
    /// Without a configured proxy this is a plain `fetch`.
    pub async fn fetch_rendered(&self, target: &Url) -> FetchResult {
        let Some(render) = &self.render else {
            tracing::warn!("No rendering proxy configured, fetching {} directly", target);
            return self.fetch(target.as_str()).await;
        };

        match crate::url::render_url(&render.endpoint, &render.api_key, target) {
            Ok(proxied) => self.fetch_with_retry(proxied.as_str(), target.as_str()).await,
            Err(e) => FetchResult::Unavailable {
                url: target.to_string(),
                attempts: 0,
                error: format!("invalid render endpoint: {}", e),
            },
        }
    }

    /// `request_url` is what goes on the wire; `label` is what gets logged and
    /// reported, so proxy credentials stay out of both.
    async fn fetch_with_retry(&self, request_url: &str, label: &str) -> FetchResult {
        let max_attempts = self.policy.max_attempts;

        let outcome = self
            .policy
            .run(|attempt| async move {
                let result = self.fetch_once(request_url).await;
                if let Err(Attempt::Retry(e)) = &result {
                    if attempt + 1 < max_attempts {
                        tracing::warn!(
                            "Error fetching {} (attempt {}/{}): {}",
                            label,
                            attempt + 1,
                            max_attempts,
                            e
                        );
                    }
                }
                result
            })
            .await;

        match outcome {
            Ok((final_url, status_code, body)) => FetchResult::Success {
                final_url,
                status_code,
                body,
            },
            Err(e) => {
                tracing::error!(
                    "Failed to fetch {} after {} attempt(s): {}",
                    label,
                    e.attempts,
                    e.last_error
                );
                FetchResult::Unavailable {
                    url: label.to_string(),
                    attempts: e.attempts,
                    error: e.last_error.to_string(),
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<(String, u16, String), Attempt<FetchFailure>> {
        self.throttle.wait_turn().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Attempt::Retry(FetchFailure::Network(e)))?;

        let status = response.status();
        if !status.is_success() {
            let failure = FetchFailure::Status(status);
            return Err(if is_retryable_status(status) {
                Attempt::Retry(failure)
            } else {
                Attempt::GiveUp(failure)
            });
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| Attempt::Retry(FetchFailure::Network(e)))?;

        Ok((final_url, status.as_u16(), body))
    }
}
