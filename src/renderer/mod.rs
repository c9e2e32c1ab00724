//! RSS 2.0 output for transformed feeds.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::app::{FullfeedError, Result};
use crate::domain::{FeedMeta, TransformedItem};

pub const GENERATOR: &str = "fullfeed";

/// Render the feed with the current time as `lastBuildDate`.
pub fn render(meta: &FeedMeta, items: &[TransformedItem]) -> Result<String> {
    render_at(meta, items, Utc::now())
}

/// Render the feed; items appear in the order given.
pub fn render_at(
    meta: &FeedMeta,
    items: &[TransformedItem],
    built_at: DateTime<Utc>,
) -> Result<String> {
    let mut w = Writer::new(Vec::with_capacity(1024 + items.len() * 2048));
    write_feed(&mut w, meta, items, built_at).map_err(xml_error)?;

    String::from_utf8(w.into_inner())
        .map_err(|e| FullfeedError::Other(format!("Rendered feed is not UTF-8: {}", e)))
}

type XmlResult = std::result::Result<(), Box<dyn std::error::Error>>;

fn xml_error(e: Box<dyn std::error::Error>) -> FullfeedError {
    FullfeedError::Other(format!("Failed to write feed: {}", e))
}

fn write_feed(
    w: &mut Writer<Vec<u8>>,
    meta: &FeedMeta,
    items: &[TransformedItem],
    built_at: DateTime<Utc>,
) -> XmlResult {
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    rss.push_attribute(("xmlns:dc", "http://purl.org/dc/elements/1.1/"));
    rss.push_attribute(("xmlns:atom", "http://www.w3.org/2005/Atom"));
    w.write_event(Event::Start(rss))?;
    w.write_event(Event::Start(BytesStart::new("channel")))?;

    let site_url = meta.site_url.as_deref().unwrap_or(&meta.feed_url);

    write_cdata_element(w, "title", meta.display_title())?;
    write_text_element(w, "link", site_url)?;
    write_cdata_element(w, "description", meta.description.as_deref().unwrap_or(""))?;

    let mut self_link = BytesStart::new("atom:link");
    self_link.push_attribute(("href", meta.feed_url.as_str()));
    self_link.push_attribute(("rel", "self"));
    self_link.push_attribute(("type", "application/rss+xml"));
    w.write_event(Event::Empty(self_link))?;

    if let Some(language) = &meta.language {
        write_text_element(w, "language", language)?;
    }
    if let Some(copyright) = &meta.copyright {
        write_text_element(w, "copyright", copyright)?;
    }
    if let Some(editor) = &meta.managing_editor {
        write_text_element(w, "managingEditor", editor)?;
    }
    if let Some(image) = &meta.image_url {
        w.write_event(Event::Start(BytesStart::new("image")))?;
        write_text_element(w, "url", image)?;
        write_cdata_element(w, "title", meta.display_title())?;
        write_text_element(w, "link", site_url)?;
        w.write_event(Event::End(BytesEnd::new("image")))?;
    }
    write_text_element(w, "generator", GENERATOR)?;
    write_text_element(w, "lastBuildDate", &built_at.to_rfc2822())?;

    for item in items {
        write_item(w, item)?;
    }

    w.write_event(Event::End(BytesEnd::new("channel")))?;
    w.write_event(Event::End(BytesEnd::new("rss")))?;
    Ok(())
}

fn write_item(w: &mut Writer<Vec<u8>>, item: &TransformedItem) -> XmlResult {
    w.write_event(Event::Start(BytesStart::new("item")))?;

    if let Some(title) = &item.title {
        write_cdata_element(w, "title", title)?;
    }
    if let Some(body) = &item.body {
        write_cdata_element(w, "description", body)?;
    }
    if let Some(url) = &item.url {
        write_text_element(w, "link", url)?;
    }
    if let Some(guid) = &item.guid {
        let permalink = item.url.as_deref() == Some(guid.as_str());
        let mut start = BytesStart::new("guid");
        start.push_attribute(("isPermaLink", if permalink { "true" } else { "false" }));
        w.write_event(Event::Start(start))?;
        w.write_event(Event::Text(BytesText::new(guid)))?;
        w.write_event(Event::End(BytesEnd::new("guid")))?;
    }
    for category in &item.categories {
        write_cdata_element(w, "category", category)?;
    }
    if let Some(author) = &item.author {
        write_cdata_element(w, "dc:creator", author)?;
    }
    if let Some(published_at) = &item.published_at {
        write_text_element(w, "pubDate", &published_at.to_rfc2822())?;
    }

    w.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn write_text_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> XmlResult {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Markup goes out as CDATA. A `]]>` inside the value would end the section,
/// so the value is split there across consecutive sections.
fn write_cdata_element(w: &mut Writer<Vec<u8>>, name: &str, text: &str) -> XmlResult {
    w.write_event(Event::Start(BytesStart::new(name)))?;
    for section in cdata_sections(text) {
        w.write_event(Event::CData(BytesCData::new(section)))?;
    }
    w.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        // Keep "]]" in this section and start the next one with ">".
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);
    sections
}
