use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a review came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    /// Submitted by an authenticated end user
    #[default]
    User,
    /// Imported by a crawler
    Crawl,
}

/// An ingested review. Created once by the aggregator, immutable thereafter.
/// Holds a weak reference to its restaurant (id only, no lifecycle coupling).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique review identifier
    pub id: Uuid,

    /// Owning restaurant identifier (weak reference)
    pub restaurant_id: String,

    /// Author identifier
    pub user_id: String,

    /// Review text
    pub text: String,

    /// Provenance tag
    pub source: ReviewSource,

    /// Derived sentiment score in [-1, 1]
    pub score: f64,

    /// Whether the score came from the local fallback heuristic
    pub degraded: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Create a new review with a derived sentiment score attached
    pub fn new(
        restaurant_id: String,
        user_id: String,
        text: String,
        source: ReviewSource,
        score: f64,
        degraded: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            restaurant_id,
            user_id,
            text,
            source,
            score,
            degraded,
            created_at: Utc::now(),
        }
    }
}

/// Aggregate snapshot returned alongside a created review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub restaurant_id: String,
    pub review_count: u64,
    pub total_score: f64,
    pub average_score: Option<f64>,
    pub keywords: Vec<String>,
}

impl AggregateSnapshot {
    pub fn new(
        restaurant_id: String,
        review_count: u64,
        total_score: f64,
        keywords: Vec<String>,
    ) -> Self {
        let average_score = if review_count > 0 {
            Some(total_score / review_count as f64)
        } else {
            None
        };

        Self {
            restaurant_id,
            review_count,
            total_score,
            average_score,
            keywords,
        }
    }
}
