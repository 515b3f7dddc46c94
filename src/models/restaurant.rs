use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Durable per-restaurant aggregate: identity, running totals and the
/// current keyword set. Numeric fields are mutated only through
/// `AggregateStore::apply_review`; the keyword set only through
/// `AggregateStore::set_keywords`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restaurant {
    /// Stable, immutable identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Street address
    pub address: String,

    /// Latitude
    pub lat: f64,

    /// Longitude
    pub lon: f64,

    /// Current keyword set, bounded by the configured cap
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Number of committed reviews
    #[serde(default)]
    pub review_count: u64,

    /// Sum of sentiment scores of all committed reviews
    #[serde(default)]
    pub total_score: f64,

    /// Cached rating from an external listing provider
    pub external_rating: Option<f64>,

    /// Preview text for listings
    pub preview: Option<String>,

    /// Timestamp when the restaurant was registered
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last aggregate mutation
    pub updated_at: DateTime<Utc>,
}

impl Restaurant {
    /// Create a new restaurant with an empty aggregate
    pub fn new(id: String, name: String, address: String, lat: f64, lon: f64) -> Self {
        let now = Utc::now();

        Self {
            id,
            name,
            address,
            lat,
            lon,
            keywords: Vec::new(),
            review_count: 0,
            total_score: 0.0,
            external_rating: None,
            preview: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Displayed average; None when no reviews are counted
    pub fn average_score(&self) -> Option<f64> {
        if self.review_count > 0 {
            Some(self.total_score / self.review_count as f64)
        } else {
            None
        }
    }

    /// Project into the summary shape returned by search
    pub fn summary(&self) -> RestaurantSummary {
        RestaurantSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            address: self.address.clone(),
            lat: self.lat,
            lon: self.lon,
            keywords: self.keywords.clone(),
            review_count: self.review_count,
            average_score: self.average_score(),
            external_rating: self.external_rating,
            preview: self.preview.clone(),
        }
    }
}

/// Read-only projection served from search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantSummary {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    pub keywords: Vec<String>,
    pub review_count: u64,
    pub average_score: Option<f64>,
    pub external_rating: Option<f64>,
    pub preview: Option<String>,
}

/// Eviction bookkeeping for one keyword in a restaurant's set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KeywordStat {
    /// Last review that contributed this keyword
    pub last_seen: DateTime<Utc>,

    /// Number of reviews that contributed this keyword
    pub frequency: u64,
}

/// A restaurant's persisted keyword set plus its eviction stats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeywordState {
    pub keywords: Vec<String>,
    pub stats: HashMap<String, KeywordStat>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_restaurant_has_empty_aggregate() {
        let restaurant = Restaurant::new(
            "r1".to_string(),
            "Noodle House".to_string(),
            "12 Main St".to_string(),
            37.5665,
            126.978,
        );

        assert_eq!(restaurant.review_count, 0);
        assert_eq!(restaurant.total_score, 0.0);
        assert!(restaurant.keywords.is_empty());
        assert!(restaurant.average_score().is_none());
    }

    #[test]
    fn test_average_score() {
        let mut restaurant = Restaurant::new(
            "r1".to_string(),
            "Noodle House".to_string(),
            "12 Main St".to_string(),
            0.0,
            0.0,
        );

        restaurant.review_count = 4;
        restaurant.total_score = 2.0;

        assert_eq!(restaurant.average_score(), Some(0.5));
    }

    #[test]
    fn test_summary_projection() {
        let mut restaurant = Restaurant::new(
            "r1".to_string(),
            "Noodle House".to_string(),
            "12 Main St".to_string(),
            1.0,
            2.0,
        );
        restaurant.keywords = vec!["spicy".to_string()];
        restaurant.review_count = 2;
        restaurant.total_score = 1.0;

        let summary = restaurant.summary();
        assert_eq!(summary.id, "r1");
        assert_eq!(summary.average_score, Some(0.5));
        assert_eq!(summary.keywords, vec!["spicy".to_string()]);
    }
}
