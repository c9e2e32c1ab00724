use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};

use crate::app::{FullfeedError, Result};
use crate::cache::{decode, encode, ContentCache};
use crate::domain::{ItemIdentity, TransformedItem};

/// SQLite-backed cache for single-node deployments without Redis.
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.run_migrations()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.run_migrations()?;
        Ok(cache)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| FullfeedError::Config(format!("Cache migration failed: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FullfeedError::CacheUnavailable(format!("Cache lock poisoned: {}", e)))
    }

    /// Delete entries whose expiry has passed. Returns the number removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM cache_entries WHERE expires_at_ms <= ?1",
            params![Utc::now().timestamp_millis()],
        )?;
        Ok(removed)
    }

    fn read(&self, key: &ItemIdentity) -> Result<Option<String>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1 AND expires_at_ms > ?2",
                params![key.storage_key(), Utc::now().timestamp_millis()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(raw)
    }

    fn write(&self, key: &ItemIdentity, raw: &str, ttl_secs: u64) -> Result<()> {
        let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        let expires_at_ms = Utc::now().timestamp_millis().saturating_add(ttl_ms);

        let conn = self.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO cache_entries (key, value, expires_at_ms) VALUES (?1, ?2, ?3)",
            params![key.storage_key(), raw, expires_at_ms],
        )?;
        Ok(())
    }
}

fn unavailable(e: FullfeedError) -> FullfeedError {
    match e {
        FullfeedError::CacheUnavailable(_) => e,
        other => FullfeedError::CacheUnavailable(other.to_string()),
    }
}

#[async_trait]
impl ContentCache for SqliteCache {
    async fn get(&self, key: &ItemIdentity) -> Result<Option<TransformedItem>> {
        let raw = self.read(key).map_err(unavailable)?;
        raw.map(|raw| decode(key, &raw)).transpose()
    }

    async fn put(&self, key: &ItemIdentity, value: &TransformedItem, ttl_secs: u64) -> Result<()> {
        let raw = encode(value)?;
        self.write(key, &raw, ttl_secs).map_err(unavailable)?;

        if let Err(e) = self.purge_expired() {
            tracing::debug!("Failed to purge expired cache entries: {}", e);
        }
        Ok(())
    }
}
