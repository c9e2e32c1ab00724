use serde::{Deserialize, Serialize};

/// Channel-level metadata carried over from the upstream feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub feed_url: String,
    pub site_url: Option<String>,
    pub image_url: Option<String>,
    pub managing_editor: Option<String>,
    pub copyright: Option<String>,
    pub language: Option<String>,
}

impl FeedMeta {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            ..Default::default()
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.feed_url)
    }
}
