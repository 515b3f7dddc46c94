use crate::error::{AppError, Result};
use crate::index::KeywordIndex;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

/// Redis keyword index: one set per keyword. SADD/SREM are natively
/// idempotent, which is exactly the contract the trait requires.
#[derive(Clone)]
pub struct RedisIndex {
    connection: ConnectionManager,
    key_prefix: String,
    timeout: Duration,
}

impl RedisIndex {
    /// Create a new Redis index
    pub async fn new(redis_url: &str, prefix: &str, timeout: Duration) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::Storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = tokio::time::timeout(timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| AppError::Timeout("redis connect timed out".to_string()))?
            .map_err(|e| AppError::Storage(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!(prefix = %prefix, "Initialized Redis keyword index");

        Ok(Self {
            connection,
            key_prefix: prefix.to_string(),
            timeout,
        })
    }

    fn keyword_key(&self, keyword: &str) -> String {
        format!("{}:keyword:{}", self.key_prefix, keyword)
    }

    /// Bound one Redis round trip
    async fn run<T>(&self, op: &str, fut: impl Future<Output = redis::RedisResult<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::Timeout(format!(
                "redis {} exceeded {}s",
                op,
                self.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl KeywordIndex for RedisIndex {
    async fn add(&self, keyword: &str, restaurant_id: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = self
            .run("sadd", conn.sadd(self.keyword_key(keyword), restaurant_id))
            .await?;
        Ok(())
    }

    async fn remove(&self, keyword: &str, restaurant_id: &str) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: () = self
            .run("srem", conn.srem(self.keyword_key(keyword), restaurant_id))
            .await?;
        Ok(())
    }

    async fn query(&self, keyword: &str) -> Result<HashSet<String>> {
        let mut conn = self.connection.clone();
        let ids: HashSet<String> = self
            .run("smembers", conn.smembers(self.keyword_key(keyword)))
            .await?;
        Ok(ids)
    }
}
