//! Memoization of transformed items, keyed by [`ItemIdentity`].
//!
//! The backend is picked from the cache URL scheme:
//!
//! ```text
//! redis://host[:port][/db]   → RedisCache
//! sqlite:///path/to/cache.db → SqliteCache
//! memory://                  → MemoryCache
//! ```
//!
//! Every backend honours the same contract: an entry is readable right
//! after `put` and reads as absent once its TTL has elapsed. Failures to
//! reach the store surface as [`FullfeedError::CacheUnavailable`]; callers
//! degrade to a miss instead of failing the request.

pub mod memory;
pub mod redis;
pub mod sqlite;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::{FullfeedError, Result};
use crate::domain::{ItemIdentity, TransformedItem};

pub use self::memory::MemoryCache;
pub use self::redis::RedisCache;
pub use self::sqlite::SqliteCache;

/// Cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend location (default: `redis://127.0.0.1`)
    pub url: String,

    /// Lifetime of a cached item in seconds (default: 900)
    pub ttl_secs: u64,

    /// Upper bound for a single cache round-trip in milliseconds (default: 2000)
    pub timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1".to_string(),
            ttl_secs: 900,
            timeout_ms: 2000,
        }
    }
}

impl CacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Key-value store with per-entry expiry
#[async_trait]
pub trait ContentCache: Send + Sync {
    /// Look up an item. `Ok(None)` means absent or expired.
    async fn get(&self, key: &ItemIdentity) -> Result<Option<TransformedItem>>;

    /// Store an item, replacing any previous entry and resetting its expiry.
    async fn put(&self, key: &ItemIdentity, value: &TransformedItem, ttl_secs: u64) -> Result<()>;
}

/// Supported cache backends, parsed from a cache URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    Redis(String),
    Sqlite(String),
    Memory,
}

impl CacheBackend {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("redis://") || url.starts_with("rediss://") {
            Ok(Self::Redis(url.to_string()))
        } else if let Some(path) = url.strip_prefix("sqlite://") {
            if path.is_empty() {
                return Err(FullfeedError::Config(
                    "sqlite cache URL needs a path, e.g. sqlite:///var/cache/fullfeed.db".into(),
                ));
            }
            Ok(Self::Sqlite(path.to_string()))
        } else if url == "memory" || url.starts_with("memory://") {
            Ok(Self::Memory)
        } else {
            Err(FullfeedError::Config(format!(
                "Unsupported cache URL '{}': expected redis://, sqlite:// or memory://",
                url
            )))
        }
    }
}

/// Open the cache backend described by the config.
pub fn open(config: &CacheConfig) -> Result<Arc<dyn ContentCache>> {
    let cache: Arc<dyn ContentCache> = match CacheBackend::from_url(&config.url)? {
        CacheBackend::Redis(url) => Arc::new(RedisCache::new(&url)?),
        CacheBackend::Sqlite(path) => Arc::new(SqliteCache::new(path)?),
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
    };

    tracing::info!("Using cache backend {}", config.url);
    Ok(cache)
}

pub(crate) fn encode(value: &TransformedItem) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| FullfeedError::Other(format!("Failed to serialize cached item: {}", e)))
}

pub(crate) fn decode(key: &ItemIdentity, raw: &str) -> Result<TransformedItem> {
    serde_json::from_str(raw).map_err(|e| {
        FullfeedError::CacheUnavailable(format!("Undecodable entry for '{}': {}", key, e))
    })
}
