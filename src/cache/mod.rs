pub mod fingerprint;
pub mod result_cache;

pub use fingerprint::query_fingerprint;
pub use result_cache::ResultCache;
