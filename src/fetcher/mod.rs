pub mod http_fetcher;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::Result;

pub use http_fetcher::HttpFetcher;

pub const DEFAULT_USER_AGENT: &str = concat!("fullfeed/", env!("CARGO_PKG_VERSION"));

/// HTTP settings for fetching feeds and article pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,

    /// User agent sent upstream
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[async_trait]
pub trait Fetcher {
    /// Fetch the raw body behind a URL
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// Fetch a document as text. Bytes that are not UTF-8 are replaced.
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let body = self.fetch(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
