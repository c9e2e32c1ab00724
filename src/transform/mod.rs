//! Per-item transformation and the feed-wide fan-out.
//!
//! ```text
//! FeedItem → identity → cache hit? ──yes──────────────────────────→ TransformedItem
//!                          │ no
//!                          └→ extract(link) → sanitize → cache put → TransformedItem
//!                                  │ failed
//!                                  └→ feed content ──→ cache put ──→ TransformedItem
//! ```

pub mod pipeline;

pub use pipeline::{FeedPipeline, PipelineConfig};

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::app::{FullfeedError, Result};
use crate::cache::ContentCache;
use crate::domain::{FeedItem, ItemIdentity, TransformedItem};
use crate::extractor::Extractor;
use crate::sanitizer;

pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_EXTRACT_TIMEOUT: Duration = Duration::from_secs(30);

/// Turns one feed item into its full-text form, memoized in the cache.
pub struct ItemTransformer {
    cache: Arc<dyn ContentCache>,
    extractor: Arc<dyn Extractor>,
    ttl_secs: u64,
    cache_timeout: Duration,
    extract_timeout: Duration,
}

impl ItemTransformer {
    pub fn new(cache: Arc<dyn ContentCache>, extractor: Arc<dyn Extractor>, ttl_secs: u64) -> Self {
        Self {
            cache,
            extractor,
            ttl_secs,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            extract_timeout: DEFAULT_EXTRACT_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, cache_timeout: Duration, extract_timeout: Duration) -> Self {
        self.cache_timeout = cache_timeout;
        self.extract_timeout = extract_timeout;
        self
    }

    /// Transform a single item.
    ///
    /// The only error is [`FullfeedError::InvalidItem`]. Cache and extraction
    /// problems degrade the result instead: a cache failure counts as a miss,
    /// and a failed extraction keeps the feed-supplied content.
    pub async fn transform(&self, item: &FeedItem) -> Result<TransformedItem> {
        let identity = ItemIdentity::resolve(item)?;

        // Hits are returned as stored, without another sanitize pass.
        if let Some(cached) = self.cached(&identity).await {
            tracing::debug!("Cache hit for {}", identity);
            return Ok(cached);
        }
        tracing::debug!("Cache miss for {}", identity);

        let body = self.full_text(item).await;
        let result = TransformedItem::from_item(item, body);

        self.store(&identity, &result).await;
        Ok(result)
    }

    async fn cached(&self, identity: &ItemIdentity) -> Option<TransformedItem> {
        match timeout(self.cache_timeout, self.cache.get(identity)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                tracing::warn!("Cache read for {} failed, treating as miss: {}", identity, e);
                None
            }
            Err(_) => {
                tracing::warn!("Cache read for {} timed out, treating as miss", identity);
                None
            }
        }
    }

    async fn full_text(&self, item: &FeedItem) -> Option<String> {
        let Some(link) = item.link.as_deref().filter(|l| !l.is_empty()) else {
            tracing::debug!("No link on '{}', keeping feed content", item.display_title());
            return item.content.clone();
        };

        match timeout(self.extract_timeout, self.extractor.extract(link)).await {
            Ok(Ok(article)) => Some(sanitizer::sanitize(&article.content, link)),
            Ok(Err(e)) => {
                tracing::warn!("Keeping feed content for {}: {}", link, e);
                item.content.clone()
            }
            Err(_) => {
                tracing::warn!(
                    "Keeping feed content for {}: extraction timed out after {:?}",
                    link,
                    self.extract_timeout
                );
                item.content.clone()
            }
        }
    }

    /// Best-effort write; the item is already produced, so failures are only logged.
    async fn store(&self, identity: &ItemIdentity, value: &TransformedItem) {
        let outcome = timeout(self.cache_timeout, self.cache.put(identity, value, self.ttl_secs))
            .await
            .unwrap_or_else(|_| Err(FullfeedError::CacheUnavailable("write timed out".into())));

        if let Err(e) = outcome {
            tracing::warn!("Failed to cache {}: {}", identity, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::testing::{item, FakeExtractor, FailingCache, StalledCache};
    use tokio_test::{assert_err, assert_ok};

    fn transformer(cache: Arc<dyn ContentCache>, extractor: Arc<FakeExtractor>) -> ItemTransformer {
        ItemTransformer::new(cache, extractor, 900)
    }

    #[tokio::test]
    async fn test_cache_hit_skips_extraction() {
        let cache = Arc::new(MemoryCache::new());
        let extractor = Arc::new(FakeExtractor::new());
        let feed_item = item("g1", "https://example.com/a/b", Some("<p>summary</p>"));

        // Stored values come back verbatim, even markup a fresh pass would strip.
        let stored = TransformedItem {
            title: Some("cached".into()),
            body: Some("<p>cached</p><script>kept()</script>".into()),
            ..Default::default()
        };
        let identity = ItemIdentity::resolve(&feed_item).unwrap();
        cache.put(&identity, &stored, 900).await.unwrap();

        let result = transformer(cache, extractor.clone())
            .transform(&feed_item)
            .await
            .unwrap();

        assert_eq!(result, stored);
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_miss_extracts_sanitizes_and_populates() {
        let cache = Arc::new(MemoryCache::new());
        let extractor = Arc::new(FakeExtractor::new().with_article(
            "https://example.com/a/b",
            r#"<div class="x"><a href="../c">next</a><img src="/img.png"><script>x()</script></div>"#,
        ));
        let feed_item = item("g1", "https://example.com/a/b", Some("<p>summary</p>"));

        let result = transformer(cache.clone(), extractor.clone())
            .transform(&feed_item)
            .await
            .unwrap();

        assert_eq!(
            result.body.as_deref(),
            Some(r#"<div><a href="https://example.com/c">next</a><img src="https://example.com/img.png" /></div>"#)
        );
        assert_eq!(result.title, feed_item.title);
        assert_eq!(result.url, feed_item.link);
        assert_eq!(result.guid, feed_item.guid);
        assert_eq!(extractor.calls(), 1);

        let identity = ItemIdentity::resolve(&feed_item).unwrap();
        assert_eq!(cache.get(&identity).await.unwrap(), Some(result));
    }

    #[tokio::test]
    async fn test_second_transform_is_served_from_cache() {
        let cache = Arc::new(MemoryCache::new());
        let extractor = Arc::new(FakeExtractor::new().with_article("https://example.com/a", "<p>full</p>"));
        let transformer = transformer(cache, extractor.clone());
        let feed_item = item("g1", "https://example.com/a", None);

        let first = transformer.transform(&feed_item).await.unwrap();
        let second = transformer.transform(&feed_item).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_keeps_feed_content() {
        let cache = Arc::new(MemoryCache::new());
        let extractor = Arc::new(FakeExtractor::new());
        let feed_item = item("g1", "https://example.com/a", Some("<p>summary & <b>more</b></p>"));

        let result = transformer(cache, extractor.clone())
            .transform(&feed_item)
            .await
            .unwrap();

        assert_eq!(result.body, feed_item.content);
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_without_content() {
        let cache = Arc::new(MemoryCache::new());
        let extractor = Arc::new(FakeExtractor::new());

        let absent = item("g1", "https://example.com/a", None);
        let result = transformer(cache.clone(), extractor.clone())
            .transform(&absent)
            .await
            .unwrap();
        assert_eq!(result.body, None);

        let empty = item("g2", "https://example.com/b", Some(""));
        let result = transformer(cache, extractor).transform(&empty).await.unwrap();
        assert_eq!(result.body, Some(String::new()));
    }

    #[tokio::test]
    async fn test_item_without_link_is_not_extracted() {
        let cache = Arc::new(MemoryCache::new());
        let extractor = Arc::new(FakeExtractor::new());
        let feed_item = FeedItem {
            title: Some("Only a title".into()),
            content: Some("<p>text</p>".into()),
            ..Default::default()
        };

        let result = transformer(cache, extractor.clone())
            .transform(&feed_item)
            .await
            .unwrap();

        assert_eq!(result.body, Some("<p>text</p>".into()));
        assert_eq!(extractor.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_item_fails() {
        let cache = Arc::new(MemoryCache::new());
        let extractor = Arc::new(FakeExtractor::new());

        let result = transformer(cache.clone(), extractor.clone())
            .transform(&FeedItem::default())
            .await;

        assert!(matches!(assert_err!(result), FullfeedError::InvalidItem));
        assert_eq!(extractor.calls(), 0);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_cache_degrades_to_miss() {
        let extractor = Arc::new(FakeExtractor::new().with_article("https://example.com/a", "<p>full</p>"));
        let feed_item = item("g1", "https://example.com/a", None);

        let result = transformer(Arc::new(FailingCache), extractor.clone())
            .transform(&feed_item)
            .await;

        let result = assert_ok!(result);
        assert_eq!(result.body, Some("<p>full</p>".into()));
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_stalled_cache_is_bounded_by_timeout() {
        let extractor = Arc::new(FakeExtractor::new().with_article("https://example.com/a", "<p>full</p>"));
        let transformer = ItemTransformer::new(Arc::new(StalledCache), extractor.clone(), 900)
            .with_timeouts(Duration::from_millis(50), Duration::from_secs(5));

        let result = transformer
            .transform(&item("g1", "https://example.com/a", None))
            .await
            .unwrap();

        assert_eq!(result.body, Some("<p>full</p>".into()));
        assert_eq!(extractor.calls(), 1);
    }

    #[tokio::test]
    async fn test_slow_extraction_times_out_to_feed_content() {
        let cache = Arc::new(MemoryCache::new());
        let extractor = Arc::new(
            FakeExtractor::new()
                .with_article("https://example.com/a", "<p>full</p>")
                .with_delay("https://example.com/a", Duration::from_secs(5)),
        );
        let transformer = ItemTransformer::new(cache, extractor, 900)
            .with_timeouts(Duration::from_secs(1), Duration::from_millis(50));
        let feed_item = item("g1", "https://example.com/a", Some("<p>summary</p>"));

        let result = transformer.transform(&feed_item).await.unwrap();

        assert_eq!(result.body, Some("<p>summary</p>".into()));
    }
}
