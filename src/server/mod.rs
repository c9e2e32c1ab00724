//! HTTP front end.
//!
//! Every `GET /<feed-url>` is answered with the full-text version of the
//! feed at `<feed-url>`. The feed URL is everything after the first `/`,
//! query string included:
//!
//! ```text
//! GET /https://example.com/feed.xml?page=2
//!      └──────────── feed url ───────────┘
//! ```

mod error;

pub use error::ProxyError;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{OriginalUri, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::app::{AppContext, Result};

/// Create the proxy router.
pub fn create_router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .fallback(proxy)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn proxy(
    State(ctx): State<Arc<AppContext>>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> std::result::Result<Response, ProxyError> {
    if method != Method::GET && method != Method::HEAD {
        return Ok(StatusCode::METHOD_NOT_ALLOWED.into_response());
    }

    let feed_url = feed_url(uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/"));
    tracing::debug!("Proxying {}", feed_url);

    let xml = ctx.proxy_feed(feed_url).await?;
    Ok(([(header::CONTENT_TYPE, "text/xml")], xml).into_response())
}

fn feed_url(path_and_query: &str) -> &str {
    path_and_query.strip_prefix('/').unwrap_or(path_and_query)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(ctx: Arc<AppContext>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Listening on http://{}", local_addr);

    axum::serve(listener, create_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::Config;
    use crate::testing::{FakeExtractor, StaticFetcher, SAMPLE_RSS};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const INVALID_ITEM_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Broken</title>
  <item><description>no identity at all</description></item>
</channel></rss>"#;

    fn router() -> Router {
        let fetcher = StaticFetcher::new()
            .with_body("https://example.com/feed.xml", SAMPLE_RSS)
            .with_body("https://example.com/feed.xml?page=2", SAMPLE_RSS)
            .with_body("https://example.com/broken.xml", INVALID_ITEM_RSS);
        let extractor =
            FakeExtractor::new().with_article("https://example.com/first", "<p>Full first</p>");

        let ctx = AppContext::with_parts(
            Arc::new(fetcher),
            Arc::new(MemoryCache::new()),
            Arc::new(extractor),
            &Config::default(),
        );
        create_router(Arc::new(ctx))
    }

    async fn get(uri: &str) -> (StatusCode, Option<String>, String) {
        let response = router()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = response.into_body().collect().await.unwrap().to_bytes();

        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_feed_url_from_path() {
        assert_eq!(
            feed_url("/https://example.com/feed.xml?a=1&b=2"),
            "https://example.com/feed.xml?a=1&b=2"
        );
        assert_eq!(feed_url("/"), "");
    }

    #[tokio::test]
    async fn test_proxy_feed() {
        let (status, content_type, body) = get("/https://example.com/feed.xml").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/xml"));
        assert!(body.contains("<![CDATA[<p>Full first</p>]]>"));
        assert!(body.contains("<![CDATA[<p>Second summary</p>]]>"));
    }

    #[tokio::test]
    async fn test_query_string_is_part_of_feed_url() {
        let (status, _, body) = get("/https://example.com/feed.xml?page=2").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Example News"));
    }

    #[tokio::test]
    async fn test_unparseable_feed_is_bad_request() {
        let (status, _, body) = get("/https://example.com/unknown.xml").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Error: Cannot parse feed.");
    }

    #[tokio::test]
    async fn test_empty_feed_url_is_bad_request() {
        let (status, _, _) = get("/").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_item_without_identity_is_bad_gateway() {
        let (status, _, body) = get("/https://example.com/broken.xml").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body,
            "Error: Upstream feed contains an item without guid, link or title."
        );
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/https://example.com/feed.xml")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
