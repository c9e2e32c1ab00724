use feed_rs::model::{Entry, Feed, Link};
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{FullfeedError, Result};
use crate::domain::{FeedItem, FeedMeta};

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Parse an RSS, Atom or JSON feed body into channel metadata and items.
    pub fn normalize(&self, feed_url: &str, body: &[u8]) -> Result<(FeedMeta, Vec<FeedItem>)> {
        // No synthesized ids: an entry without one must fall back to link or title.
        let feed = parser::Builder::new()
            .id_generator(|_links, _title, _uri| String::new())
            .build()
            .parse(body)
            .map_err(|e| FullfeedError::FeedParse(e.to_string()))?;

        let meta = Self::feed_meta(feed_url, &feed);
        let items = feed.entries.into_iter().map(Self::feed_item).collect();

        Ok((meta, items))
    }

    fn feed_meta(feed_url: &str, feed: &Feed) -> FeedMeta {
        let self_link = feed
            .links
            .iter()
            .find(|l| is_self_link(l))
            .map(|l| l.href.clone());
        let site_url = feed
            .links
            .iter()
            .find(|l| !is_self_link(l))
            .map(|l| l.href.clone());

        FeedMeta {
            title: feed
                .title
                .as_ref()
                .map(|t| decode_html_entities(&t.content).to_string()),
            description: feed
                .description
                .as_ref()
                .map(|d| decode_html_entities(&d.content).to_string()),
            feed_url: self_link.unwrap_or_else(|| feed_url.to_string()),
            site_url,
            image_url: feed
                .logo
                .as_ref()
                .or(feed.icon.as_ref())
                .map(|i| i.uri.clone()),
            managing_editor: feed
                .authors
                .first()
                .or(feed.contributors.first())
                .map(|p| p.name.clone()),
            copyright: feed.rights.as_ref().map(|r| r.content.clone()),
            language: feed.language.clone(),
        }
    }

    fn feed_item(entry: Entry) -> FeedItem {
        let guid = Some(entry.id).filter(|id| !id.is_empty());
        let link = article_link(&entry.links).map(|l| l.href.clone());
        let summary = entry.summary.map(|s| s.content);
        let content = entry.content.and_then(|c| c.body).or(summary);

        FeedItem {
            title: entry
                .title
                .map(|t| decode_html_entities(&t.content).to_string()),
            link,
            guid,
            content,
            categories: entry
                .categories
                .into_iter()
                .map(|c| c.label.unwrap_or(c.term))
                .collect(),
            author: entry.authors.first().map(|a| a.name.clone()),
            published_at: entry.published.or(entry.updated),
        }
    }
}

fn is_self_link(link: &Link) -> bool {
    link.rel.as_deref() == Some("self")
}

/// The entry's own page: an `alternate` (or unqualified) link, else the first one.
fn article_link(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
}
