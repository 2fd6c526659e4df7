//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::utils::{canonical_address, pool_link, short_address};

/// Canonical pool metric record. One per (chain, address) in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetric {
    pub chain: String,
    pub address: String,
    pub name: String,
    pub tvl: f64,
    pub volume_24h: f64,
    /// Fraction, 0.01 = 1%
    pub base_yield: f64,
    /// Fraction, summed across reward programs
    pub incentive_yield: f64,
    pub link: String,
}

impl PoolMetric {
    /// Empty record for `address` on `chain` with every metric at its default.
    pub fn new(chain: &str, address: &str) -> Self {
        let address = canonical_address(address);
        Self {
            chain: chain.to_string(),
            name: short_address(&address),
            link: pool_link(chain, &address),
            address,
            tvl: 0.0,
            volume_24h: 0.0,
            base_yield: 0.0,
            incentive_yield: 0.0,
        }
    }

    pub fn combined_yield(&self) -> f64 {
        self.base_yield + self.incentive_yield
    }

    /// Value of the ranking metric for this record
    pub fn metric(&self, metric: SortMetric) -> f64 {
        match metric {
            SortMetric::Volume => self.volume_24h,
            SortMetric::Tvl => self.tvl,
            SortMetric::BaseYield => self.base_yield,
            SortMetric::IncentiveYield => self.incentive_yield,
            SortMetric::CombinedYield => self.combined_yield(),
        }
    }
}

/// Partial record produced by normalizing one upstream item.
/// `None` means the source did not supply the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolContribution {
    pub address: String,
    pub name: Option<String>,
    pub tvl: Option<f64>,
    pub volume_24h: Option<f64>,
    pub base_yield: Option<f64>,
    pub incentive_yield: Option<f64>,
    pub link: Option<String>,
}

impl PoolContribution {
    pub fn new(address: &str) -> Self {
        Self {
            address: canonical_address(address),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_tvl(mut self, tvl: f64) -> Self {
        self.tvl = Some(tvl);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume_24h = Some(volume);
        self
    }

    pub fn with_base_yield(mut self, base_yield: f64) -> Self {
        self.base_yield = Some(base_yield);
        self
    }

    pub fn with_incentive_yield(mut self, incentive_yield: f64) -> Self {
        self.incentive_yield = Some(incentive_yield);
        self
    }
}

/// Kind of metric an upstream source is expected to supply.
/// `ALL` is also the processing order inside one chain pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Pools,
    BaseYield,
    Volume,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 3] = [
        MetricCategory::Pools,
        MetricCategory::BaseYield,
        MetricCategory::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricCategory::Pools => "pools",
            MetricCategory::BaseYield => "base_yield",
            MetricCategory::Volume => "volume",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of payload layouts a candidate may answer with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    PoolList,
    VolumeList,
    ApyList,
}

/// Ranking key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMetric {
    Volume,
    Tvl,
    BaseYield,
    IncentiveYield,
    CombinedYield,
}

impl SortMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMetric::Volume => "volume",
            SortMetric::Tvl => "tvl",
            SortMetric::BaseYield => "apy",
            SortMetric::IncentiveYield => "rewards",
            SortMetric::CombinedYield => "combined",
        }
    }
}

impl fmt::Display for SortMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMetric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "volume" | "vol" => Ok(SortMetric::Volume),
            "tvl" => Ok(SortMetric::Tvl),
            "apy" | "base" | "base_yield" => Ok(SortMetric::BaseYield),
            "rewards" | "incentive" | "incentive_yield" => Ok(SortMetric::IncentiveYield),
            "combined" | "total" | "combined_yield" => Ok(SortMetric::CombinedYield),
            _ => Err(anyhow::anyhow!("Unknown sort metric: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metric_defaults() {
        let pool = PoolMetric::new("ethereum", "  0xABCDEF0123456789  ");
        assert_eq!(pool.address, "0xabcdef0123456789");
        assert_eq!(pool.tvl, 0.0);
        assert_eq!(pool.volume_24h, 0.0);
        assert_eq!(pool.base_yield, 0.0);
        assert_eq!(pool.name, "0xabcd…6789");
        assert!(pool.link.contains("ethereum"));
        assert!(pool.link.ends_with("0xabcdef0123456789"));
    }

    #[test]
    fn test_metric_selection() {
        let mut pool = PoolMetric::new("polygon", "0x1");
        pool.volume_24h = 10.0;
        pool.tvl = 20.0;
        pool.base_yield = 0.02;
        pool.incentive_yield = 0.03;

        assert_eq!(pool.metric(SortMetric::Volume), 10.0);
        assert_eq!(pool.metric(SortMetric::Tvl), 20.0);
        assert!((pool.metric(SortMetric::CombinedYield) - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_sort_metric_parsing() {
        assert_eq!("volume".parse::<SortMetric>().unwrap(), SortMetric::Volume);
        assert_eq!("APY".parse::<SortMetric>().unwrap(), SortMetric::BaseYield);
        assert_eq!("rewards".parse::<SortMetric>().unwrap(), SortMetric::IncentiveYield);
        assert!("fees".parse::<SortMetric>().is_err());
    }
}
