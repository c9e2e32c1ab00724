//! # fullfeed
//!
//! A proxy that turns summary-only RSS/Atom feeds into full-text feeds.
//!
//! ## Architecture
//!
//! Every request runs the same pipeline:
//!
//! ```text
//! Fetcher → Normalizer → FeedPipeline ─┬→ ItemTransformer (per item, concurrent) → Renderer
//!                                      │     ├ ContentCache
//!                                      │     ├ Extractor
//!                                      │     └ sanitizer
//! ```
//!
//! An item whose full text was produced recently is served from the cache;
//! otherwise its article page is extracted, sanitized and cached for the
//! configured TTL. Extraction failures keep the feed's own content.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run the proxy
//! fullfeed serve --port 3000
//! curl http://localhost:3000/https://blog.rust-lang.org/feed.xml
//!
//! # Transform a single feed to stdout
//! fullfeed transform https://blog.rust-lang.org/feed.xml
//!
//! # Print the default configuration
//! fullfeed config > ~/.config/fullfeed/config.toml
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together fetcher,
/// normalizer, cache, extractor and pipeline.
pub mod app;

/// Content cache with per-entry TTL.
///
/// - [`ContentCache`](cache::ContentCache): Async trait for cache backends
/// - [`RedisCache`](cache::RedisCache), [`SqliteCache`](cache::SqliteCache),
///   [`MemoryCache`](cache::MemoryCache): Backends selected by URL scheme
pub mod cache;

/// Command-line interface using clap.
///
/// - `serve [--host H] [--port P]` - Run the HTTP proxy
/// - `transform <url>` - Transform one feed to stdout
/// - `config` - Print the default configuration
pub mod cli;

/// Configuration loaded from `~/.config/fullfeed/config.toml` and the environment.
pub mod config;

/// Core domain models.
///
/// - [`FeedMeta`](domain::FeedMeta): Channel metadata
/// - [`FeedItem`](domain::FeedItem): Items as parsed from the upstream feed
/// - [`ItemIdentity`](domain::ItemIdentity): Cache identity of an item
/// - [`TransformedItem`](domain::TransformedItem): Items with full-text bodies
pub mod domain;

/// Full-text article extraction.
pub mod extractor;

/// HTTP fetching of feeds and article pages.
pub mod fetcher;

pub mod logging;

/// Feed parsing and normalization.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0
/// into [`FeedMeta`](domain::FeedMeta) and [`FeedItem`](domain::FeedItem)s.
pub mod normalizer;

/// RSS 2.0 rendering of transformed feeds.
pub mod renderer;

/// Markup whitelisting and link absolutization.
pub mod sanitizer;

/// HTTP front end built with axum.
pub mod server;

/// Per-item transformation and the concurrent feed pipeline.
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;
