use async_trait::async_trait;
use reqwest::Client;

use crate::app::Result;
use crate::fetcher::{Fetcher, FetcherConfig};

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        let body = response.bytes().await?.to_vec();
        Ok(body)
    }

    /// Decodes with the charset from `Content-Type`, UTF-8 when none is given.
    async fn fetch_text(&self, url: &str) -> Result<String> {
        tracing::debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;

        Ok(response.text().await?)
    }
}
