//! HTTP client settings for the Bluesky AppView

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Bluesky client configuration
#[derive(Debug, Clone)]
pub struct BlueskyConfig {
    /// AppView base URL (default: https://public.api.bsky.app)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Consecutive failed feed pages tolerated before giving up
    pub max_retries: u32,
    /// Base wait before retrying a page, in milliseconds
    pub retry_delay_ms: u64,
    /// Largest page the API accepts
    pub page_size: usize,
    /// Posts collected per user unless the caller asks otherwise
    pub posts_per_user: usize,
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://public.api.bsky.app".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 2000,
            page_size: 100,
            posts_per_user: 100,
        }
    }
}

impl BlueskyConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Retry wait plus up to half of it again as random jitter
    pub fn retry_delay(&self) -> Duration {
        use rand::Rng;
        let jitter = rand::thread_rng().gen_range(0..=self.retry_delay_ms / 2);
        Duration::from_millis(self.retry_delay_ms + jitter)
    }
}

/// Errors from the Bluesky client
#[derive(Debug, Error)]
pub enum BlueskyError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("Failed to decode {endpoint} response: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },

    #[error("Actor not found: {0}")]
    NotFound(String),

    #[error("Max retries ({0}) exceeded")]
    MaxRetries(u32),
}

/// Create an HTTP client for the AppView
pub fn create_client(config: &BlueskyConfig) -> Result<Client, BlueskyError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("stance-lens/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| BlueskyError::ClientBuild(e.to_string()))
}
