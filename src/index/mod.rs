pub mod memory;
pub mod redis;

pub use memory::InMemoryIndex;
pub use redis::RedisIndex;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Bidirectional keyword → restaurant-id mapping, maintained incrementally
/// by the aggregator as keyword sets change. Every operation is
/// independently idempotent: double adds and removes of non-members are
/// no-ops, not errors.
#[async_trait]
pub trait KeywordIndex: Send + Sync {
    /// Associate a restaurant with a keyword
    async fn add(&self, keyword: &str, restaurant_id: &str) -> Result<()>;

    /// Dissociate a restaurant from a keyword
    async fn remove(&self, keyword: &str, restaurant_id: &str) -> Result<()>;

    /// Restaurants currently associated with a keyword
    async fn query(&self, keyword: &str) -> Result<HashSet<String>>;
}

/// Create a keyword index from configuration. The index lives in the same
/// backend as the aggregate store so both survive or fail together.
pub async fn create_index(config: &StoreConfig) -> Result<Arc<dyn KeywordIndex>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory keyword index");
            Ok(Arc::new(InMemoryIndex::new()))
        }
        StoreBackend::Redis => {
            let redis_url = config.redis_url.as_ref().ok_or_else(|| {
                AppError::Configuration(
                    "store.redis_url is required for the redis backend".to_string(),
                )
            })?;

            let index = RedisIndex::new(
                redis_url,
                &config.key_prefix,
                std::time::Duration::from_secs(config.timeout_secs),
            )
            .await?;
            Ok(Arc::new(index))
        }
    }
}
