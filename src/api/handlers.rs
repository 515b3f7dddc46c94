use crate::api::AppState;
use crate::error::Result;
use crate::models::{AggregateSnapshot, Restaurant, RestaurantSummary, Review, ReviewSource};
use crate::search::{MatchMode, SearchQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Health check endpoint
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Register a restaurant
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(request): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, Json<RestaurantSummary>)> {
    request.validate()?;

    let mut restaurant = Restaurant::new(
        request.id,
        request.name,
        request.address,
        request.lat,
        request.lon,
    );
    restaurant.external_rating = request.external_rating;
    restaurant.preview = request.preview;

    state
        .aggregator
        .store()
        .insert_restaurant(&restaurant)
        .await?;

    Ok((StatusCode::CREATED, Json(restaurant.summary())))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRestaurantRequest {
    #[validate(length(min = 1, max = 100))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    pub external_rating: Option<f64>,
    pub preview: Option<String>,
}

/// Fetch one restaurant's aggregate
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RestaurantSummary>> {
    let restaurant = state
        .aggregator
        .store()
        .get_restaurant(&id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Restaurant {} not found", id)))?;

    Ok(Json(restaurant.summary()))
}

/// Ingest a review
pub async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewCreatedResponse>)> {
    request.validate()?;

    let created = state
        .aggregator
        .create_review(crate::aggregation::NewReview {
            text: request.text,
            restaurant_id: request.restaurant_id,
            user_id: request.user_id,
            source: request.source,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewCreatedResponse {
            review: created.review,
            aggregate: created.aggregate,
            degraded: created.degraded,
        }),
    ))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1, max = 10_000))]
    pub text: String,
    #[validate(length(min = 1, max = 100))]
    pub restaurant_id: String,
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[serde(default)]
    pub source: ReviewSource,
}

#[derive(Debug, Serialize)]
pub struct ReviewCreatedResponse {
    pub review: Review,
    pub aggregate: AggregateSnapshot,
    pub degraded: bool,
}

/// Fetch one review record
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Review>> {
    let review = state
        .aggregator
        .store()
        .get_review(&id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("Review {} not found", id)))?;

    Ok(Json(review))
}

/// Expand a keyword into related search terms
pub async fn expand_keyword(
    State(state): State<AppState>,
    Json(request): Json<ExpandKeywordRequest>,
) -> Result<Json<ExpandKeywordResponse>> {
    request.validate()?;

    let expansion = state.aggregator.expand_keyword(&request.keyword).await?;

    Ok(Json(ExpandKeywordResponse {
        keywords: expansion.keywords,
        stale: expansion.stale,
        degraded: expansion.degraded,
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExpandKeywordRequest {
    #[validate(length(min = 1, max = 100))]
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct ExpandKeywordResponse {
    pub keywords: Vec<String>,
    pub stale: bool,
    pub degraded: bool,
}

/// Recompute a restaurant's keyword set from its stored reviews
pub async fn rebuild_keywords(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RebuildKeywordsResponse>> {
    let keywords = state.aggregator.rebuild_keywords(&id).await?;

    Ok(Json(RebuildKeywordsResponse {
        restaurant_id: id,
        keywords,
    }))
}

#[derive(Debug, Serialize)]
pub struct RebuildKeywordsResponse {
    pub restaurant_id: String,
    pub keywords: Vec<String>,
}

/// Keyword search over the aggregate index
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>> {
    let keywords: Vec<String> = params
        .keywords
        .split(',')
        .map(str::to_string)
        .collect();
    let query = SearchQuery::new(&keywords, params.r#match, params.limit)?;

    let results = state.resolver.search(&query).await?;

    Ok(Json(SearchResponse {
        count: results.len(),
        results,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Comma-separated keyword list
    pub keywords: String,
    #[serde(default)]
    pub r#match: MatchMode,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: usize,
    pub results: Vec<RestaurantSummary>,
}
