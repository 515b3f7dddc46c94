pub mod aggregation;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod search;
pub mod sentiment;
pub mod store;

pub use error::{AppError, Result};
