pub mod query;
pub mod resolver;

pub use query::{MatchMode, SearchQuery};
pub use resolver::SearchResolver;
