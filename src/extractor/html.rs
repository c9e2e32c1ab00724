use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};

use crate::app::{FullfeedError, Result};
use crate::extractor::{ExtractorConfig, Extractor, RawArticle};
use crate::fetcher::Fetcher;

/// Extractor that downloads the page and selects the article element
pub struct HttpExtractor {
    config: ExtractorConfig,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
}

impl HttpExtractor {
    /// Fails when a configured selector is not valid CSS.
    pub fn new(config: ExtractorConfig, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Result<Self> {
        for selector in config.content_selectors.iter().chain(&config.remove_selectors) {
            Selector::parse(selector).map_err(|e| {
                FullfeedError::Config(format!("Invalid selector '{}': {}", selector, e))
            })?;
        }

        Ok(Self { config, fetcher })
    }
}

#[async_trait]
impl Extractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<RawArticle> {
        let page = self
            .fetcher
            .fetch_text(url)
            .await
            .map_err(|e| FullfeedError::ExtractionFailed(format!("{}: {}", url, e)))?;

        extract_main_content(&page, &self.config)
            .map(|content| RawArticle { content })
            .ok_or_else(|| FullfeedError::ExtractionFailed(format!("No content extracted from {}", url)))
    }
}

/// Pick the article markup out of a full HTML page.
///
/// Removes every element matching `remove_selectors`, then returns the inner
/// HTML of the first `content_selectors` match holding at least
/// `min_text_length` characters of text. Falls back to `<body>`; returns
/// `None` when nothing but whitespace is left.
pub fn extract_main_content(page: &str, config: &ExtractorConfig) -> Option<String> {
    let mut document = Html::parse_document(page);

    for selector in parse_selectors(&config.remove_selectors) {
        let ids: Vec<_> = document.select(&selector).map(|e| e.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    for selector in parse_selectors(&config.content_selectors) {
        let found = document
            .select(&selector)
            .find(|element| text_length(element) >= config.min_text_length);

        if let Some(element) = found {
            tracing::debug!("Article matched selector {:?}", selector);
            return non_empty(element.inner_html());
        }
    }

    let body = Selector::parse("body").ok()?;
    document
        .select(&body)
        .next()
        .map(|element| element.inner_html())
        .and_then(non_empty)
}

fn parse_selectors(selectors: &[String]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

fn text_length(element: &ElementRef<'_>) -> usize {
    element.text().collect::<String>().trim().chars().count()
}

fn non_empty(html: String) -> Option<String> {
    if html.trim().is_empty() {
        None
    } else {
        Some(html)
    }
}
