pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::aggregation::ReviewAggregator;
use crate::search::SearchResolver;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<ReviewAggregator>,
    pub resolver: Arc<SearchResolver>,
}

impl AppState {
    pub fn new(aggregator: Arc<ReviewAggregator>, resolver: Arc<SearchResolver>) -> Self {
        Self {
            aggregator,
            resolver,
        }
    }
}
