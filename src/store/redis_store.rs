use crate::error::{AppError, Result};
use crate::models::{KeywordState, Restaurant, Review};
use crate::store::AggregateStore;
use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Redis-backed aggregate store. Each restaurant is a hash whose numeric
/// aggregate fields are mutated exclusively with HINCRBY/HINCRBYFLOAT, so
/// concurrent ingestion never loses an update regardless of process count.
#[derive(Clone)]
pub struct RedisStore {
    #[allow(dead_code)]
    client: Arc<Client>,
    connection: ConnectionManager,
    key_prefix: String,
    timeout: Duration,
}

impl RedisStore {
    /// Create a new Redis store
    pub async fn new(redis_url: &str, prefix: &str, timeout: Duration) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AppError::Storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = tokio::time::timeout(timeout, ConnectionManager::new(client.clone()))
            .await
            .map_err(|_| AppError::Timeout("redis connect timed out".to_string()))?
            .map_err(|e| AppError::Storage(format!("Failed to connect to Redis: {}", e)))?;

        // Probe the connection before accepting traffic
        let mut test_conn = connection.clone();
        tokio::time::timeout(
            timeout,
            redis::cmd("PING").query_async::<_, String>(&mut test_conn),
        )
        .await
        .map_err(|_| AppError::Timeout("redis ping timed out".to_string()))?
        .map_err(|e| AppError::Storage(format!("Redis connection test failed: {}", e)))?;

        tracing::info!(prefix = %prefix, "Initialized Redis aggregate store");

        Ok(Self {
            client: Arc::new(client),
            connection,
            key_prefix: prefix.to_string(),
            timeout,
        })
    }

    /// Bound one Redis round trip. A hung backend surfaces as Timeout
    /// instead of stalling the caller indefinitely.
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

    fn restaurant_key(&self, id: &str) -> String {
        format!("{}:restaurant:{}", self.key_prefix, id)
    }

    fn review_key(&self, id: &Uuid) -> String {
        format!("{}:review:{}", self.key_prefix, id)
    }

    fn restaurant_reviews_key(&self, id: &str) -> String {
        format!("{}:restaurant:{}:reviews", self.key_prefix, id)
    }

    /// Reassemble a restaurant from its hash fields. The static document is
    /// written once at registration; aggregate fields live beside it so the
    /// increments stay native.
    fn assemble(fields: HashMap<String, String>) -> Result<Option<Restaurant>> {
        let Some(doc) = fields.get("doc") else {
            return Ok(None);
        };

        let mut restaurant: Restaurant = serde_json::from_str(doc)?;

        if let Some(count) = fields.get("review_count") {
            restaurant.review_count = count
                .parse()
                .map_err(|e| AppError::Storage(format!("bad review_count: {}", e)))?;
        }
        if let Some(total) = fields.get("total_score") {
            restaurant.total_score = total
                .parse()
                .map_err(|e| AppError::Storage(format!("bad total_score: {}", e)))?;
        }
        if let Some(keywords) = fields.get("keywords") {
            restaurant.keywords = serde_json::from_str(keywords)?;
        }
        if let Some(updated_at) = fields.get("updated_at") {
            restaurant.updated_at = updated_at
                .parse()
                .map_err(|e| AppError::Storage(format!("bad updated_at: {}", e)))?;
        }

        Ok(Some(restaurant))
    }
}

#[async_trait]
impl AggregateStore for RedisStore {
    async fn insert_restaurant(&self, restaurant: &Restaurant) -> Result<()> {
        let mut conn = self.connection.clone();
        let key = self.restaurant_key(&restaurant.id);

        // HSETNX on the document field keeps registration first-writer-wins
        let created: bool = self
            .run(
                "hsetnx",
                conn.hset_nx(&key, "doc", serde_json::to_string(restaurant)?),
            )
            .await?;

        if !created {
            return Err(AppError::Conflict(format!(
                "Restaurant {} already registered",
                restaurant.id
            )));
        }

        let _: () = self
            .run(
                "init fields",
                redis::pipe()
                    .atomic()
                    .hset(&key, "review_count", restaurant.review_count)
                    .ignore()
                    .hset(&key, "total_score", restaurant.total_score)
                    .ignore()
                    .hset(&key, "keywords", serde_json::to_string(&restaurant.keywords)?)
                    .ignore()
                    .hset(&key, "keyword_stats", "{}")
                    .ignore()
                    .hset(&key, "updated_at", restaurant.updated_at.to_rfc3339())
                    .ignore()
                    .query_async(&mut conn),
            )
            .await?;

        tracing::debug!(restaurant_id = %restaurant.id, "Restaurant registered");
        Ok(())
    }

    async fn get_restaurant(&self, id: &str) -> Result<Option<Restaurant>> {
        let mut conn = self.connection.clone();
        let fields: HashMap<String, String> = self
            .run("hgetall", conn.hgetall(self.restaurant_key(id)))
            .await?;
        Self::assemble(fields)
    }

    async fn get_restaurants(&self, ids: &[String]) -> Result<Vec<Restaurant>> {
        let fetched =
            futures::future::try_join_all(ids.iter().map(|id| self.get_restaurant(id))).await?;
        Ok(fetched.into_iter().flatten().collect())
    }

    async fn apply_review(&self, restaurant_id: &str, score: f64) -> Result<(u64, f64)> {
        let mut conn = self.connection.clone();
        let key = self.restaurant_key(restaurant_id);

        let exists: bool = self.run("hexists", conn.hexists(&key, "doc")).await?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "Restaurant {} not found",
                restaurant_id
            )));
        }

        // Single MULTI/EXEC: both counters move together, atomically
        let (count, total): (i64, f64) = self
            .run(
                "apply review",
                redis::pipe()
                    .atomic()
                    .cmd("HINCRBY")
                    .arg(&key)
                    .arg("review_count")
                    .arg(1)
                    .cmd("HINCRBYFLOAT")
                    .arg(&key)
                    .arg("total_score")
                    .arg(score)
                    .hset(&key, "updated_at", Utc::now().to_rfc3339())
                    .ignore()
                    .query_async(&mut conn),
            )
            .await?;

        tracing::debug!(
            restaurant_id = %restaurant_id,
            review_count = count,
            total_score = total,
            "Review applied to aggregate"
        );

        Ok((count as u64, total))
    }

    async fn keyword_state(&self, restaurant_id: &str) -> Result<KeywordState> {
        let mut conn = self.connection.clone();
        let key = self.restaurant_key(restaurant_id);

        let exists: bool = self.run("hexists", conn.hexists(&key, "doc")).await?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "Restaurant {} not found",
                restaurant_id
            )));
        }

        let (keywords, stats): (Option<String>, Option<String>) = self
            .run(
                "keyword state",
                redis::pipe()
                    .hget(&key, "keywords")
                    .hget(&key, "keyword_stats")
                    .query_async(&mut conn),
            )
            .await?;

        Ok(KeywordState {
            keywords: keywords.map(|k| serde_json::from_str(&k)).transpose()?.unwrap_or_default(),
            stats: stats.map(|s| serde_json::from_str(&s)).transpose()?.unwrap_or_default(),
        })
    }

    async fn set_keywords(
        &self,
        restaurant_id: &str,
        state: &KeywordState,
    ) -> Result<Vec<String>> {
        let mut conn = self.connection.clone();
        let key = self.restaurant_key(restaurant_id);

        let exists: bool = self.run("hexists", conn.hexists(&key, "doc")).await?;
        if !exists {
            return Err(AppError::NotFound(format!(
                "Restaurant {} not found",
                restaurant_id
            )));
        }

        // Read-and-swap in one transaction: the returned value is the set
        // that was actually persisted before this write, which is what the
        // index diff must be computed against.
        let (previous,): (Option<String>,) = self
            .run(
                "swap keywords",
                redis::pipe()
                    .atomic()
                    .hget(&key, "keywords")
                    .hset(&key, "keywords", serde_json::to_string(&state.keywords)?)
                    .ignore()
                    .hset(&key, "keyword_stats", serde_json::to_string(&state.stats)?)
                    .ignore()
                    .hset(&key, "updated_at", Utc::now().to_rfc3339())
                    .ignore()
                    .query_async(&mut conn),
            )
            .await?;

        Ok(previous
            .map(|p| serde_json::from_str(&p))
            .transpose()?
            .unwrap_or_default())
    }

    async fn save_review(&self, review: &Review) -> Result<()> {
        let mut conn = self.connection.clone();

        let _: () = self
            .run(
                "save review",
                redis::pipe()
                    .atomic()
                    .set(self.review_key(&review.id), serde_json::to_string(review)?)
                    .ignore()
                    .rpush(
                        self.restaurant_reviews_key(&review.restaurant_id),
                        review.id.to_string(),
                    )
                    .ignore()
                    .query_async(&mut conn),
            )
            .await?;

        tracing::debug!(review_id = %review.id, restaurant_id = %review.restaurant_id, "Review saved");
        Ok(())
    }

    async fn get_review(&self, id: &Uuid) -> Result<Option<Review>> {
        let mut conn = self.connection.clone();
        let json: Option<String> = self.run("get review", conn.get(self.review_key(id))).await?;
        json.map(|j| serde_json::from_str(&j).map_err(Into::into))
            .transpose()
    }

    async fn reviews_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<Review>> {
        let mut conn = self.connection.clone();
        let ids: Vec<String> = self
            .run(
                "lrange reviews",
                conn.lrange(self.restaurant_reviews_key(restaurant_id), 0, -1),
            )
            .await?;

        let mut reviews = Vec::with_capacity(ids.len());
        for id in ids {
            let json: Option<String> = self
                .run(
                    "get review",
                    conn.get(format!("{}:review:{}", self.key_prefix, id)),
                )
                .await?;
            if let Some(json) = json {
                reviews.push(serde_json::from_str(&json)?);
            }
        }

        Ok(reviews)
    }
}
