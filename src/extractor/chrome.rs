use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::sync::Semaphore;

use crate::app::{FullfeedError, Result};
use crate::extractor::{ExtractionScript, Extractor, ExtractorConfig, RawArticle};

fn failed(context: &str, e: impl std::fmt::Display) -> FullfeedError {
    FullfeedError::ExtractionFailed(format!("{}: {}", context, e))
}

/// Chrome-based extractor using chromiumoxide
pub struct ChromeExtractor {
    session: Arc<Session>,
    semaphore: Arc<Semaphore>,
}

/// Browser state shared with the page tasks
struct Session {
    browser: Browser,
    config: ExtractorConfig,
    script: ExtractionScript,
}

impl ChromeExtractor {
    /// Launch a browser with the given configuration
    pub async fn new(config: ExtractorConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| FullfeedError::Config(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            FullfeedError::Config(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive the browser's event loop
        tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        let script = ExtractionScript::new(&config);

        Ok(Self {
            session: Arc::new(Session {
                browser,
                config,
                script,
            }),
            semaphore,
        })
    }
}

impl Session {
    /// Open a tab, extract, and close the tab again on every path.
    async fn extract_page(&self, url: &str) -> Result<RawArticle> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| failed("Failed to create page", e))?;

        let result = within(self.config.timeout(), self.read_article(&page, url)).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page for {}: {}", url, e);
        }

        result
    }

    async fn read_article(&self, page: &Page, url: &str) -> Result<RawArticle> {
        if let Some(ref ua) = self.config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| failed("Failed to set user agent", e))?;
        }

        page.wait_for_navigation()
            .await
            .map_err(|e| failed("Navigation failed", e))?;

        // Additional wait for dynamic content
        tokio::time::sleep(self.config.wait_after_load()).await;

        let value: serde_json::Value = page
            .evaluate(self.script.source().to_string())
            .await
            .map_err(|e| failed("Script execution failed", e))?
            .into_value()
            .map_err(|e| failed("Failed to parse result", format!("{:?}", e)))?;

        let html = value["html"].as_str().unwrap_or("").to_string();
        if html.trim().is_empty() {
            return Err(FullfeedError::ExtractionFailed(format!(
                "No content extracted from {}",
                url
            )));
        }

        if let Some(selector) = value["selector"].as_str() {
            tracing::debug!("Chrome matched selector {} on {}", selector, url);
        }

        Ok(RawArticle { content: html })
    }
}

/// Bound `work` by `limit`; running out of time is an extraction failure.
async fn within<T>(limit: Duration, work: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, work)
        .await
        .unwrap_or_else(|_| Err(failed("Page load timed out", format!("{:?}", limit))))
}

/// Run `work` on its own task. It keeps running, and releases what it holds,
/// after the caller stops waiting for it.
async fn detached<T: Send + 'static>(
    work: impl Future<Output = Result<T>> + Send + 'static,
) -> Result<T> {
    match tokio::spawn(work).await {
        Ok(result) => result,
        Err(e) => Err(failed("Page task failed", e)),
    }
}

#[async_trait]
impl Extractor for ChromeExtractor {
    async fn extract(&self, url: &str) -> Result<RawArticle> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| failed("Semaphore error", e))?;

        let session = self.session.clone();
        let url = url.to_string();

        // The permit is held until the tab is closed, even if the caller timed out.
        detached(async move {
            let _permit = permit;
            session.extract_page(&url).await
        })
        .await
    }
}
