use crate::api::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::health_check))
        .route("/health/ready", get(handlers::health_check))
        // Restaurant registry
        .route("/v1/restaurants", post(handlers::create_restaurant))
        .route("/v1/restaurants/:id", get(handlers::get_restaurant))
        .route(
            "/v1/restaurants/:id/keywords/rebuild",
            post(handlers::rebuild_keywords),
        )
        // Review ingestion
        .route("/v1/reviews", post(handlers::create_review))
        .route("/v1/reviews/:id", get(handlers::get_review))
        // Keyword expansion
        .route("/v1/keywords/expand", post(handlers::expand_keyword))
        // Search
        .route("/v1/search", get(handlers::search))
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
