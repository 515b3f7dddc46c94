use crate::config::{StoreBackend, StoreConfig};
use crate::error::{AppError, Result};
use crate::store::{AggregateStore, InMemoryStore, RedisStore};
use std::sync::Arc;

/// Create an aggregate store from configuration
pub async fn create_store(config: &StoreConfig) -> Result<Arc<dyn AggregateStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory aggregate store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Redis => {
            let redis_url = config.redis_url.as_ref().ok_or_else(|| {
                AppError::Configuration(
                    "store.redis_url is required for the redis backend".to_string(),
                )
            })?;

            let store = RedisStore::new(
                redis_url,
                &config.key_prefix,
                std::time::Duration::from_secs(config.timeout_secs),
            )
            .await?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_by_default() {
        let config = StoreConfig::default();
        assert!(create_store(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_redis_backend_requires_url() {
        let config = StoreConfig {
            backend: StoreBackend::Redis,
            redis_url: None,
            ..StoreConfig::default()
        };

        let err = create_store(&config).await.err().unwrap();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
