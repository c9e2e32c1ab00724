use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::app::{FullfeedError, Result};
use crate::cache::ContentCache;
use crate::domain::{ItemIdentity, TransformedItem};

struct Entry {
    value: TransformedItem,
    expires_at: Instant,
}

/// In-process cache, lost on restart. Expired entries are dropped on read
/// and swept on every write.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn deadline(ttl_secs: u64) -> Instant {
    let now = Instant::now();
    now.checked_add(Duration::from_secs(ttl_secs))
        .unwrap_or_else(|| now + Duration::from_secs(u32::MAX as u64))
}

fn poisoned<E: std::fmt::Display>(e: E) -> FullfeedError {
    FullfeedError::CacheUnavailable(format!("memory cache lock poisoned: {}", e))
}

#[async_trait]
impl ContentCache for MemoryCache {
    async fn get(&self, key: &ItemIdentity) -> Result<Option<TransformedItem>> {
        let mut entries = self.entries.lock().map_err(poisoned)?;

        let expired = match entries.get(key.as_str()) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key.as_str());
        }
        Ok(None)
    }

    async fn put(&self, key: &ItemIdentity, value: &TransformedItem, ttl_secs: u64) -> Result<()> {
        let mut entries = self.entries.lock().map_err(poisoned)?;

        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);

        entries.insert(
            key.as_str().to_string(),
            Entry {
                value: value.clone(),
                expires_at: deadline(ttl_secs),
            },
        );

        Ok(())
    }
}
