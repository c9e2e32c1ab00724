use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the upstream feed, as produced by the normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub guid: Option<String>,
    /// Feed-supplied markup: full content when present, otherwise the summary
    pub content: Option<String>,
    pub categories: Vec<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl FeedItem {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }
}

/// An item with its body replaced by extracted, sanitized markup.
///
/// This is both the pipeline output and the cached value, so it must
/// round-trip through JSON unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformedItem {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
    pub guid: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl TransformedItem {
    /// Project a feed item onto the output shape with the given body.
    pub fn from_item(item: &FeedItem, body: Option<String>) -> Self {
        Self {
            title: item.title.clone(),
            body,
            url: item.link.clone(),
            guid: item.guid.clone(),
            categories: item.categories.clone(),
            author: item.author.clone(),
            published_at: item.published_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_item() -> FeedItem {
        FeedItem {
            title: Some("Hello".into()),
            link: Some("https://example.com/hello".into()),
            guid: Some("hello-1".into()),
            content: Some("<p>summary</p>".into()),
            categories: vec!["rust".into(), "feeds".into()],
            author: Some("Jo".into()),
            published_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_from_item_replaces_content_with_body() {
        let item = sample_item();
        let transformed = TransformedItem::from_item(&item, Some("<p>full</p>".into()));

        assert_eq!(transformed.title, item.title);
        assert_eq!(transformed.body, Some("<p>full</p>".into()));
        assert_eq!(transformed.url, item.link);
        assert_eq!(transformed.guid, item.guid);
        assert_eq!(transformed.categories, item.categories);
        assert_eq!(transformed.author, item.author);
        assert_eq!(transformed.published_at, item.published_at);
    }

    #[test]
    fn test_transformed_item_json_round_trip() {
        let transformed = TransformedItem::from_item(&sample_item(), None);
        let json = serde_json::to_string(&transformed).unwrap();
        let back: TransformedItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, transformed);
    }

    #[test]
    fn test_display_title_without_title() {
        let item = FeedItem::default();
        assert_eq!(item.display_title(), "(Untitled)");
    }
}
