//! Full-text article extraction.
//!
//! Given an article URL, an [`Extractor`] returns the main readable content
//! of the page as HTML. Two implementations are available:
//!
//! - [`HttpExtractor`]: fetches the page over HTTP and picks the article
//!   element with CSS selectors
//! - [`ChromeExtractor`]: loads the page in headless Chrome and runs the
//!   same selector policy in the page, for JavaScript-rendered sites
//!
//! Every failure (network, empty page, browser error) is reported as
//! [`FullfeedError::ExtractionFailed`](crate::app::FullfeedError::ExtractionFailed).

mod chrome;
mod config;
mod html;
mod script;

pub use chrome::ChromeExtractor;
pub use config::{ExtractorBackend, ExtractorConfig};
pub use html::{extract_main_content, HttpExtractor};
pub use script::ExtractionScript;

use std::sync::Arc;

use async_trait::async_trait;

use crate::app::Result;
use crate::fetcher::Fetcher;

/// Article content returned by an extractor
#[derive(Debug, Clone, PartialEq)]
pub struct RawArticle {
    /// The extracted article markup
    pub content: String,
}

/// Trait for article extraction implementations
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract the main content of the page behind `url`
    async fn extract(&self, url: &str) -> Result<RawArticle>;
}

/// Build the extractor selected in the config.
pub async fn open(
    config: &ExtractorConfig,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
) -> Result<Arc<dyn Extractor>> {
    let extractor: Arc<dyn Extractor> = match config.backend {
        ExtractorBackend::Http => Arc::new(HttpExtractor::new(config.clone(), fetcher)?),
        ExtractorBackend::Chrome => Arc::new(ChromeExtractor::new(config.clone()).await?),
    };

    tracing::info!("Using {:?} extractor", config.backend);
    Ok(extractor)
}
