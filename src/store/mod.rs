pub mod factory;
pub mod memory;
pub mod redis_store;

pub use factory::create_store;
pub use memory::InMemoryStore;
pub use redis_store::RedisStore;

use crate::error::Result;
use crate::models::{KeywordState, Restaurant, Review};
use async_trait::async_trait;
use uuid::Uuid;

/// Durable aggregate storage. `apply_review` is the single operation that
/// must be linearizable per restaurant: it is an atomic increment at the
/// storage layer, never an application-level read-modify-write.
#[async_trait]
pub trait AggregateStore: Send + Sync {
    /// Register a restaurant. Fails with Conflict if the id is taken.
    async fn insert_restaurant(&self, restaurant: &Restaurant) -> Result<()>;

    /// Fetch one restaurant
    async fn get_restaurant(&self, id: &str) -> Result<Option<Restaurant>>;

    /// Fetch several restaurants; absent ids are skipped
    async fn get_restaurants(&self, ids: &[String]) -> Result<Vec<Restaurant>>;

    /// Atomically fold one review's score into the aggregate, returning
    /// the new (review_count, total_score). NotFound if the id is absent.
    async fn apply_review(&self, restaurant_id: &str, score: f64) -> Result<(u64, f64)>;

    /// Current keyword set plus eviction stats
    async fn keyword_state(&self, restaurant_id: &str) -> Result<KeywordState>;

    /// Atomically swap the persisted keyword state, returning the
    /// previously persisted keyword set (the diff base for the index).
    async fn set_keywords(&self, restaurant_id: &str, state: &KeywordState)
        -> Result<Vec<String>>;

    /// Persist an immutable review record
    async fn save_review(&self, review: &Review) -> Result<()>;

    /// Fetch one review
    async fn get_review(&self, id: &Uuid) -> Result<Option<Review>>;

    /// All reviews committed against a restaurant, oldest first
    async fn reviews_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<Review>>;
}
