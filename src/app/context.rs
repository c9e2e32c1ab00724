use std::sync::Arc;
use std::time::Instant;

use url::Url;

use crate::app::error::Result;
use crate::cache::{self, ContentCache};
use crate::config::Config;
use crate::extractor::{self, Extractor};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::normalizer::Normalizer;
use crate::renderer;
use crate::transform::{FeedPipeline, ItemTransformer};

pub struct AppContext {
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub normalizer: Normalizer,
    pub pipeline: FeedPipeline,
}

impl AppContext {
    /// Build the fetcher, cache backend and extractor described by `config`.
    pub async fn new(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetcher)?);
        let cache = cache::open(&config.cache)?;
        let extractor = extractor::open(&config.extractor, fetcher.clone()).await?;

        Ok(Self::with_parts(fetcher, cache, extractor, config))
    }

    /// Assemble a context from already-built components.
    pub fn with_parts(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        cache: Arc<dyn ContentCache>,
        extractor: Arc<dyn Extractor>,
        config: &Config,
    ) -> Self {
        let transformer = ItemTransformer::new(cache, extractor, config.cache.ttl_secs)
            .with_timeouts(config.cache.timeout(), config.extractor.timeout());
        let pipeline = FeedPipeline::with_config(Arc::new(transformer), &config.pipeline);

        Self {
            fetcher,
            normalizer: Normalizer::new(),
            pipeline,
        }
    }

    /// Fetch `feed_url`, replace every item body with its full text, and
    /// return the result as an RSS 2.0 document.
    pub async fn proxy_feed(&self, feed_url: &str) -> Result<String> {
        let started = Instant::now();
        let feed_url = Url::parse(feed_url)?;

        let body = self.fetcher.fetch(feed_url.as_str()).await?;
        let (meta, items) = self.normalizer.normalize(feed_url.as_str(), &body)?;
        let item_count = items.len();

        let transformed = self.pipeline.transform_all(items).await?;
        let xml = renderer::render(&meta, &transformed)?;

        tracing::info!(
            "Transformed {} items of '{}' in {:?}",
            item_count,
            meta.display_title(),
            started.elapsed()
        );
        Ok(xml)
    }
}
