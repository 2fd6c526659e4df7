//! Pool domain - normalization, merging and ranking of pool metrics

mod chain_snapshot;
mod pool_merger;
mod pool_normalizer;
mod pool_ranker;

pub use chain_snapshot::{CategoryReport, ChainSnapshot};
pub use pool_merger::{merge, merge_into};
pub use pool_normalizer::{
    normalize, resolve_number, resolve_text, FieldTable, NormalizedBatch, RewardList, SchemaNormalizer, SourceKey, Unit,
    BASE_YIELD_FIELDS, POOL_FIELDS, VOLUME_FIELDS,
};
pub use pool_ranker::{is_inactive, PoolRanker, SelectFilters, ACTIVITY_EPSILON, MAX_LIMIT};
