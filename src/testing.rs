//! Test doubles shared by the unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{FullfeedError, Result};
use crate::cache::ContentCache;
use crate::domain::{FeedItem, ItemIdentity, TransformedItem};
use crate::extractor::{Extractor, RawArticle};
use crate::fetcher::Fetcher;

pub fn item(guid: &str, link: &str, content: Option<&str>) -> FeedItem {
    FeedItem {
        title: Some(format!("Title of {}", guid)),
        link: Some(link.to_string()),
        guid: Some(guid.to_string()),
        content: content.map(String::from),
        categories: vec!["news".to_string()],
        author: Some("Author".to_string()),
        published_at: None,
    }
}

/// Extractor serving canned articles; unknown URLs fail.
#[derive(Default)]
pub struct FakeExtractor {
    articles: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_article(mut self, url: &str, content: &str) -> Self {
        self.articles.insert(url.to_string(), content.to_string());
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for FakeExtractor {
    async fn extract(&self, url: &str) -> Result<RawArticle> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }

        self.articles
            .get(url)
            .map(|content| RawArticle {
                content: content.clone(),
            })
            .ok_or_else(|| FullfeedError::ExtractionFailed(format!("no article for {}", url)))
    }
}

/// Cache whose backend is always unreachable
pub struct FailingCache;

#[async_trait]
impl ContentCache for FailingCache {
    async fn get(&self, _key: &ItemIdentity) -> Result<Option<TransformedItem>> {
        Err(FullfeedError::CacheUnavailable("connection refused".into()))
    }

    async fn put(&self, _key: &ItemIdentity, _value: &TransformedItem, _ttl_secs: u64) -> Result<()> {
        Err(FullfeedError::CacheUnavailable("connection refused".into()))
    }
}

/// Cache that never answers
pub struct StalledCache;

#[async_trait]
impl ContentCache for StalledCache {
    async fn get(&self, _key: &ItemIdentity) -> Result<Option<TransformedItem>> {
        futures::future::pending().await
    }

    async fn put(&self, _key: &ItemIdentity, _value: &TransformedItem, _ttl_secs: u64) -> Result<()> {
        futures::future::pending().await
    }
}

/// Fetcher serving canned bodies; unknown URLs answer like a refused connection.
#[derive(Default)]
pub struct StaticFetcher {
    bodies: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.as_bytes().to_vec());
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FullfeedError::FeedParse(format!("unreachable: {}", url)))
    }
}

pub const SAMPLE_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example News</title>
    <link>https://example.com/</link>
    <description>Latest stories</description>
    <item>
      <title>First story</title>
      <link>https://example.com/first</link>
      <guid>https://example.com/first</guid>
      <description>&lt;p&gt;First summary&lt;/p&gt;</description>
    </item>
    <item>
      <title>Second story</title>
      <link>https://example.com/second</link>
      <guid>second-guid</guid>
      <description>&lt;p&gt;Second summary&lt;/p&gt;</description>
    </item>
  </channel>
</rss>"#;
