use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which extractor implementation to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorBackend {
    /// Plain HTTP fetch + HTML parsing
    Http,
    /// Headless Chrome, for pages that render their content with JavaScript
    Chrome,
}

/// Configuration for article extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Extractor implementation (default: http)
    pub backend: ExtractorBackend,

    /// Upper bound for one extraction in seconds (default: 30)
    pub timeout_secs: u64,

    /// Minimum text length for a selector match to count as the article (default: 100)
    pub min_text_length: usize,

    /// CSS selectors to try for article content extraction, in priority order
    pub content_selectors: Vec<String>,

    /// CSS selectors for elements to remove (ads, navigation, etc.)
    pub remove_selectors: Vec<String>,

    /// Chrome only: run the browser without a window (default: true)
    pub headless: bool,

    /// Chrome only: wait after page load for dynamic content in milliseconds (default: 1000)
    pub wait_after_load_ms: u64,

    /// Chrome only: maximum concurrent browser pages (default: 5)
    pub max_concurrency: usize,

    /// Chrome only: user agent string to use
    pub user_agent: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            backend: ExtractorBackend::Http,
            timeout_secs: 30,
            min_text_length: 100,
            content_selectors: vec![
                // Common article content selectors in priority order
                "article".to_string(),
                "[role=\"main\"]".to_string(),
                "main".to_string(),
                ".post-content".to_string(),
                ".article-content".to_string(),
                ".entry-content".to_string(),
                ".content".to_string(),
                "#content".to_string(),
                ".post".to_string(),
                ".article".to_string(),
                ".blog-post".to_string(),
            ],
            remove_selectors: vec![
                "nav".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "aside".to_string(),
                ".sidebar".to_string(),
                ".advertisement".to_string(),
                ".ad".to_string(),
                ".ads".to_string(),
                ".social-share".to_string(),
                ".comments".to_string(),
                ".related-posts".to_string(),
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
            ],
            headless: true,
            wait_after_load_ms: 1000,
            max_concurrency: 5,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the wait time after load as a Duration
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }
}
