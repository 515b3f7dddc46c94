pub mod aggregator;
pub mod keywords;

pub use aggregator::{NewReview, ReviewAggregator, ReviewCreated};
pub use keywords::merge_keywords;
