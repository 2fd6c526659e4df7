//! Per-chain merged result of one pipeline run

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::shared::errors::PipelineError;
use crate::shared::types::{MetricCategory, PoolContribution, PoolMetric};
use crate::shared::utils::canonical_address;

use super::pool_merger::merge_into;

/// Diagnostics for one metric category of one chain run
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub category: MetricCategory,
    /// URL of the candidate that answered
    pub source: Option<String>,
    pub attempts: usize,
    pub merged: usize,
    pub skipped: usize,
    pub tls_fallback: bool,
    pub error: Option<PipelineError>,
}

impl CategoryReport {
    pub fn exhausted(chain: &str, category: MetricCategory, attempts: usize) -> Self {
        Self {
            category,
            source: None,
            attempts,
            merged: 0,
            skipped: 0,
            tls_fallback: false,
            error: Some(PipelineError::EmptyResult {
                chain: chain.to_string(),
                category,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Address-keyed merge target owned by exactly one pipeline invocation.
/// Records keep first-discovery order.
#[derive(Debug, Clone)]
pub struct ChainSnapshot {
    pub chain: String,
    pub fetched_at: DateTime<Utc>,
    pools: Vec<PoolMetric>,
    index: HashMap<String, usize>,
    reports: Vec<CategoryReport>,
}

impl ChainSnapshot {
    pub fn new(chain: &str) -> Self {
        Self {
            chain: chain.to_string(),
            fetched_at: Utc::now(),
            pools: Vec::new(),
            index: HashMap::new(),
            reports: Vec::new(),
        }
    }

    /// Merge one contribution into the record for its address
    pub fn apply(&mut self, contribution: &PoolContribution) {
        let address = canonical_address(&contribution.address);
        if address.is_empty() {
            return;
        }
        let existing = self.index.get(&address).copied();
        match existing {
            Some(slot) => merge_into(&mut self.pools[slot], contribution),
            None => {
                let mut record = PoolMetric::new(&self.chain, &address);
                merge_into(&mut record, contribution);
                self.index.insert(address, self.pools.len());
                self.pools.push(record);
            }
        }
    }

    pub fn apply_all<'a>(&mut self, contributions: impl IntoIterator<Item = &'a PoolContribution>) -> usize {
        let mut count = 0;
        for contribution in contributions {
            self.apply(contribution);
            count += 1;
        }
        count
    }

    pub fn get(&self, address: &str) -> Option<&PoolMetric> {
        self.index
            .get(&canonical_address(address))
            .map(|&slot| &self.pools[slot])
    }

    pub fn pools(&self) -> &[PoolMetric] {
        &self.pools
    }

    pub fn into_pools(self) -> Vec<PoolMetric> {
        self.pools
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn record(&mut self, report: CategoryReport) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[CategoryReport] {
        &self.reports
    }

    /// Every category ran out of candidates
    pub fn is_exhausted(&self) -> bool {
        !self.reports.is_empty() && self.reports.iter().all(|r| !r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_join_case_insensitively() {
        let mut snapshot = ChainSnapshot::new("ethereum");
        snapshot.apply(&PoolContribution::new("0xABC").with_tvl(10.0));
        snapshot.apply(&PoolContribution {
            address: "  0xAbc ".to_string(),
            volume_24h: Some(5.0),
            ..Default::default()
        });

        assert_eq!(snapshot.len(), 1);
        let pool = snapshot.get("0XABC").unwrap();
        assert_eq!(pool.tvl, 10.0);
        assert_eq!(pool.volume_24h, 5.0);
    }

    #[test]
    fn test_discovery_order_preserved() {
        let mut snapshot = ChainSnapshot::new("polygon");
        let contributions = vec![
            PoolContribution::new("0x3"),
            PoolContribution::new("0x1"),
            PoolContribution::new("0x3").with_volume(1.0),
            PoolContribution::new("0x2"),
        ];
        assert_eq!(snapshot.apply_all(&contributions), 4);

        let order: Vec<&str> = snapshot.pools().iter().map(|p| p.address.as_str()).collect();
        assert_eq!(order, vec!["0x3", "0x1", "0x2"]);
    }

    #[test]
    fn test_exhaustion_tracking() {
        let mut snapshot = ChainSnapshot::new("arbitrum");
        assert!(!snapshot.is_exhausted());
        snapshot.record(CategoryReport::exhausted("arbitrum", MetricCategory::Pools, 3));
        snapshot.record(CategoryReport::exhausted("arbitrum", MetricCategory::Volume, 2));
        assert!(snapshot.is_exhausted());
        assert!(snapshot.is_empty());
    }
}
