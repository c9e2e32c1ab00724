use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::app::FullfeedError;

/// A failed proxy request, rendered as a plain-text error page.
#[derive(Debug)]
pub struct ProxyError(pub FullfeedError);

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            e if e.is_feed_error() => StatusCode::BAD_REQUEST,
            FullfeedError::InvalidItem => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match &self.0 {
            e if e.is_feed_error() => "Error: Cannot parse feed.".to_string(),
            FullfeedError::InvalidItem => {
                "Error: Upstream feed contains an item without guid, link or title.".to_string()
            }
            e => format!("Error: Internal Server Error: {}", e),
        }
    }
}

impl From<FullfeedError> for ProxyError {
    fn from(err: FullfeedError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::warn!("Request failed: {}", self.0);
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_errors_are_bad_request() {
        let err = ProxyError(FullfeedError::FeedParse("unexpected EOF".into()));

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Error: Cannot parse feed.");
    }

    #[test]
    fn test_invalid_item_is_bad_gateway() {
        let err = ProxyError(FullfeedError::InvalidItem);

        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.message().contains("without guid, link or title"));
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = ProxyError(FullfeedError::Other("boom".into()));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Error: Internal Server Error: boom");
    }
}
