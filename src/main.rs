use review_pulse::{
    aggregation::ReviewAggregator,
    api::{build_router, AppState},
    cache::ResultCache,
    config::Config,
    index::create_index,
    search::SearchResolver,
    sentiment::{KeywordExpander, SentimentScorer},
    store::create_store,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration before tracing so the configured level can act
    // as the filter fallback
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize tracing; RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "review_pulse={},tower_http=info",
            config.observability.log_level
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting Review Pulse v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage backend
    tracing::info!("Storage backend: {:?}", config.store.backend);
    let store = create_store(&config.store).await?;
    let index = create_index(&config.store).await?;
    tracing::info!("Storage backend initialized");

    // Initialize upstream clients
    let scorer = Arc::new(SentimentScorer::from_config(&config.sentiment)?);
    if config.sentiment.endpoint.is_none() {
        tracing::warn!("No sentiment endpoint configured, scoring with local lexicon only");
    }
    let expander = Arc::new(KeywordExpander::from_config(&config.expansion)?);
    if config.expansion.endpoint.is_none() {
        tracing::warn!("No expansion endpoint configured, expansion returns the keyword itself");
    }

    // Shared result cache: the aggregator invalidates what the resolver populates
    let cache = ResultCache::new(&config.cache);
    if !cache.is_enabled() {
        tracing::warn!("Result cache disabled, every search resolves from the index");
    }

    let aggregator = Arc::new(ReviewAggregator::new(
        store.clone(),
        index.clone(),
        cache.clone(),
        scorer,
        expander,
        config.aggregation.keyword_cap,
    ));
    let resolver = Arc::new(SearchResolver::new(store, index, cache));

    let app_state = AppState::new(aggregator, resolver);
    let app = build_router(app_state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   REST API: http://{}/v1/reviews", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
