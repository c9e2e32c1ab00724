use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::app::{FullfeedError, Result};
use crate::domain::{FeedItem, TransformedItem};
use crate::transform::ItemTransformer;

/// Fan-out settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum items transformed at once per request; 0 means no limit (default: 0)
    pub max_concurrency: usize,
}

/// Transforms all items of a feed concurrently, preserving their order.
#[derive(Clone)]
pub struct FeedPipeline {
    transformer: Arc<ItemTransformer>,
    /// Per-call limit; each `transform_all` gets its own permits
    max_concurrency: Option<usize>,
}

impl FeedPipeline {
    pub fn new(transformer: Arc<ItemTransformer>) -> Self {
        Self {
            transformer,
            max_concurrency: None,
        }
    }

    pub fn with_config(transformer: Arc<ItemTransformer>, config: &PipelineConfig) -> Self {
        Self {
            transformer,
            max_concurrency: (config.max_concurrency > 0).then_some(config.max_concurrency),
        }
    }

    /// Transform every item; output index `i` belongs to input index `i`.
    ///
    /// Every task runs to completion before results are inspected. If any
    /// item is invalid, the first such error in input order is returned and
    /// the whole feed fails.
    pub async fn transform_all(&self, items: Vec<FeedItem>) -> Result<Vec<TransformedItem>> {
        let semaphore = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            let transformer = self.transformer.clone();
            let semaphore = semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => Some(
                        semaphore
                            .acquire_owned()
                            .await
                            .map_err(|e| FullfeedError::Task(e.to_string()))?,
                    ),
                    None => None,
                };

                transformer.transform(&item).await
            });

            handles.push(handle);
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                    Err(FullfeedError::Task(e.to_string()))
                }
            };
            results.push(result);
        }

        results.into_iter().collect()
    }
}
