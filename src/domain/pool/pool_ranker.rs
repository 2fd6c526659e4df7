//! Filtering and ranking of merged pool records

use serde::{Deserialize, Serialize};

use crate::shared::types::{PoolMetric, SortMetric};

/// Hard ceiling on result size regardless of what the caller asks for
pub const MAX_LIMIT: usize = 50;

/// Base yield below this counts as zero for activity checks
pub const ACTIVITY_EPSILON: f64 = 1e-6;

/// Independently toggleable filters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectFilters {
    /// Drop pools with TVL below this floor
    pub min_tvl: Option<f64>,
    /// Drop pools with no liquidity, or with neither yield nor volume
    pub suppress_inactive: bool,
}

impl Default for SelectFilters {
    fn default() -> Self {
        Self {
            min_tvl: None,
            suppress_inactive: true,
        }
    }
}

impl SelectFilters {
    pub fn none() -> Self {
        Self {
            min_tvl: None,
            suppress_inactive: false,
        }
    }

    pub fn accepts(&self, pool: &PoolMetric) -> bool {
        if let Some(floor) = self.min_tvl {
            if pool.tvl < floor {
                return false;
            }
        }
        !(self.suppress_inactive && is_inactive(pool))
    }
}

pub fn is_inactive(pool: &PoolMetric) -> bool {
    pool.tvl <= 0.0 || (pool.base_yield.abs() < ACTIVITY_EPSILON && pool.volume_24h <= 1.0)
}

/// Filter, sort descending by `metric`, truncate.
///
/// Sorting is stable: pools with equal metric values keep the order they
/// were discovered in. Callers may rely on this.
#[derive(Debug, Clone, Copy)]
pub struct PoolRanker {
    max_limit: usize,
}

impl Default for PoolRanker {
    fn default() -> Self {
        Self::new(MAX_LIMIT)
    }
}

impl PoolRanker {
    pub fn new(max_limit: usize) -> Self {
        Self {
            max_limit: max_limit.clamp(1, MAX_LIMIT),
        }
    }

    pub fn max_limit(&self) -> usize {
        self.max_limit
    }

    pub fn clamp_limit(&self, limit: usize) -> usize {
        limit.clamp(1, self.max_limit)
    }

    pub fn select(
        &self,
        records: Vec<PoolMetric>,
        metric: SortMetric,
        limit: usize,
        filters: &SelectFilters,
    ) -> Vec<PoolMetric> {
        let mut selected: Vec<PoolMetric> = records.into_iter().filter(|p| filters.accepts(p)).collect();
        selected.sort_by(|a, b| b.metric(metric).total_cmp(&a.metric(metric)));
        selected.truncate(self.clamp_limit(limit));
        selected
    }
}
