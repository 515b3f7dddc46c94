use crate::error::{AppError, Result};
use crate::models::{KeywordState, KeywordStat, Restaurant, Review};
use crate::store::AggregateStore;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// One restaurant's durable record: the aggregate plus keyword eviction stats
#[derive(Debug, Clone)]
struct RestaurantRecord {
    restaurant: Restaurant,
    keyword_stats: HashMap<String, KeywordStat>,
}

/// In-memory aggregate store (for single-process deployments and testing).
/// Per-restaurant atomicity comes from mutating through the shard-locked
/// dashmap entry; restaurants on different shards mutate in parallel.
#[derive(Clone)]
pub struct InMemoryStore {
    restaurants: Arc<DashMap<String, RestaurantRecord>>,
    reviews: Arc<DashMap<Uuid, Review>>,
    restaurant_reviews: Arc<DashMap<String, Vec<Uuid>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            restaurants: Arc::new(DashMap::new()),
            reviews: Arc::new(DashMap::new()),
            restaurant_reviews: Arc::new(DashMap::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AggregateStore for InMemoryStore {
    async fn insert_restaurant(&self, restaurant: &Restaurant) -> Result<()> {
        if self.restaurants.contains_key(&restaurant.id) {
            return Err(AppError::Conflict(format!(
                "Restaurant {} already registered",
                restaurant.id
            )));
        }

        self.restaurants.insert(
            restaurant.id.clone(),
            RestaurantRecord {
                restaurant: restaurant.clone(),
                keyword_stats: HashMap::new(),
            },
        );

        tracing::debug!(restaurant_id = %restaurant.id, "Restaurant registered");
        Ok(())
    }

    async fn get_restaurant(&self, id: &str) -> Result<Option<Restaurant>> {
        Ok(self.restaurants.get(id).map(|entry| entry.restaurant.clone()))
    }

    async fn get_restaurants(&self, ids: &[String]) -> Result<Vec<Restaurant>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.restaurants.get(id).map(|entry| entry.restaurant.clone()))
            .collect())
    }

    async fn apply_review(&self, restaurant_id: &str, score: f64) -> Result<(u64, f64)> {
        let mut entry = self.restaurants.get_mut(restaurant_id).ok_or_else(|| {
            AppError::NotFound(format!("Restaurant {} not found", restaurant_id))
        })?;

        entry.restaurant.review_count += 1;
        entry.restaurant.total_score += score;
        entry.restaurant.updated_at = Utc::now();

        let applied = (entry.restaurant.review_count, entry.restaurant.total_score);

        tracing::debug!(
            restaurant_id = %restaurant_id,
            review_count = applied.0,
            total_score = applied.1,
            "Review applied to aggregate"
        );

        Ok(applied)
    }

    async fn keyword_state(&self, restaurant_id: &str) -> Result<KeywordState> {
        let entry = self.restaurants.get(restaurant_id).ok_or_else(|| {
            AppError::NotFound(format!("Restaurant {} not found", restaurant_id))
        })?;

        Ok(KeywordState {
            keywords: entry.restaurant.keywords.clone(),
            stats: entry.keyword_stats.clone(),
        })
    }

    async fn set_keywords(
        &self,
        restaurant_id: &str,
        state: &KeywordState,
    ) -> Result<Vec<String>> {
        let mut entry = self.restaurants.get_mut(restaurant_id).ok_or_else(|| {
            AppError::NotFound(format!("Restaurant {} not found", restaurant_id))
        })?;

        let previous =
            std::mem::replace(&mut entry.restaurant.keywords, state.keywords.clone());
        entry.keyword_stats = state.stats.clone();
        entry.restaurant.updated_at = Utc::now();

        Ok(previous)
    }

    async fn save_review(&self, review: &Review) -> Result<()> {
        self.reviews.insert(review.id, review.clone());
        self.restaurant_reviews
            .entry(review.restaurant_id.clone())
            .or_default()
            .push(review.id);

        tracing::debug!(review_id = %review.id, restaurant_id = %review.restaurant_id, "Review saved");
        Ok(())
    }

    async fn get_review(&self, id: &Uuid) -> Result<Option<Review>> {
        Ok(self.reviews.get(id).map(|entry| entry.clone()))
    }

    async fn reviews_for_restaurant(&self, restaurant_id: &str) -> Result<Vec<Review>> {
        let Some(ids) = self.restaurant_reviews.get(restaurant_id) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| self.reviews.get(id).map(|entry| entry.clone()))
            .collect())
    }
}
