use thiserror::Error;

#[derive(Error, Debug)]
pub enum FullfeedError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parsing error: {0}")]
    FeedParse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Item has no guid, link or title to identify it")]
    InvalidItem,

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("{0}")]
    Other(String),
}

impl FullfeedError {
    /// Errors caused by the upstream feed document or its location.
    pub fn is_feed_error(&self) -> bool {
        matches!(
            self,
            FullfeedError::Http(_) | FullfeedError::FeedParse(_) | FullfeedError::InvalidUrl(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FullfeedError>;
