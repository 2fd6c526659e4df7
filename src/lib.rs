//! Poolscope - liquidity pool metrics aggregator
//! Fetches TVL, volume and yield feeds per chain, merges them by pool address
//! and ranks the result on demand

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use application::{Aggregator, PoolQueryService, QueryResult, QueryTarget};
pub use config::Config;
pub use domain::endpoint::EndpointRegistry;
pub use domain::pool::{ChainSnapshot, PoolRanker, SelectFilters};
pub use infrastructure::http::Fetcher;
pub use shared::types::{PoolMetric, SortMetric};
