use std::fmt;

use ::redis::aio::ConnectionManager;
use ::redis::AsyncCommands;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::app::{FullfeedError, Result};
use crate::cache::{decode, encode, ContentCache};
use crate::domain::{ItemIdentity, TransformedItem};

// Keep connection attempts short; the next request retries anyway.
const CONNECT_BACKOFF_BASE: u64 = 2;
const CONNECT_BACKOFF_FACTOR_MS: u64 = 50;
const CONNECT_RETRIES: usize = 1;

/// Redis-backed cache using `GET` / `SET EX`.
///
/// The connection is opened on first use and reopened after a failed
/// attempt, so the proxy keeps serving (uncached) while Redis is down.
pub struct RedisCache {
    client: ::redis::Client,
    conn: Mutex<Option<ConnectionManager>>,
    redis_url: String,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("redis_url", &self.redis_url)
            .finish()
    }
}

impl RedisCache {
    /// Validate the URL without connecting.
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = ::redis::Client::open(redis_url)
            .map_err(|e| FullfeedError::Config(format!("Invalid Redis URL {}: {}", redis_url, e)))?;

        Ok(Self {
            client,
            conn: Mutex::new(None),
            redis_url: redis_url.to_string(),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let mut guard = self.conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        tracing::info!("Connecting to Redis at {}", self.redis_url);
        let conn = ConnectionManager::new_with_backoff(
            self.client.clone(),
            CONNECT_BACKOFF_BASE,
            CONNECT_BACKOFF_FACTOR_MS,
            CONNECT_RETRIES,
        )
        .await
        .map_err(|e| unavailable("connect", e))?;
        *guard = Some(conn.clone());
        Ok(conn)
    }
}

fn unavailable(op: &str, e: ::redis::RedisError) -> FullfeedError {
    FullfeedError::CacheUnavailable(format!("Redis {} failed: {}", op, e))
}

#[async_trait]
impl ContentCache for RedisCache {
    async fn get(&self, key: &ItemIdentity) -> Result<Option<TransformedItem>> {
        let mut conn = self.connection().await?;
        let storage_key = key.storage_key();

        let raw: Option<String> = conn
            .get(&storage_key)
            .await
            .map_err(|e| unavailable("GET", e))?;

        raw.map(|raw| decode(key, &raw)).transpose()
    }

    async fn put(&self, key: &ItemIdentity, value: &TransformedItem, ttl_secs: u64) -> Result<()> {
        let mut conn = self.connection().await?;
        let raw = encode(value)?;

        conn.set_ex::<_, _, ()>(key.storage_key(), raw, ttl_secs)
            .await
            .map_err(|e| unavailable("SETEX", e))
    }
}
