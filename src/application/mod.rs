//! Application layer - pipeline orchestration, query surface and CLI

pub mod aggregator;
pub mod commands;
pub mod query;

pub use aggregator::Aggregator;
pub use commands::{Cli, Commands, CommandExecutor};
pub use query::{PoolQueryService, QueryResult, QueryTarget};
