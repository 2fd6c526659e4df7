// src/report.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::query::{QueryResult, QueryTarget};
use crate::shared::types::{PoolMetric, SortMetric};
use crate::shared::utils::{format_money, format_pct};

const NAME_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
pub struct PoolReport {
    pub target: String,
    pub metric: SortMetric,
    pub limit: usize,
    pub pools: Vec<PoolMetric>,
    pub generated_at: DateTime<Utc>,
    #[serde(skip)]
    cross_chain: bool,
}

impl PoolReport {
    pub fn new(target: &QueryTarget, metric: SortMetric, limit: usize, result: &QueryResult) -> Self {
        Self {
            target: target.to_string(),
            metric,
            limit,
            pools: result.pools().to_vec(),
            generated_at: Utc::now(),
            cross_chain: *target == QueryTarget::All,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Header line plus one compact line per pool
    pub fn to_text(&self) -> String {
        if self.pools.is_empty() {
            return format!("⚠️ No data for {}", self.target);
        }
        let mut lines = vec![format!(
            "{} · top {} by {}",
            self.target.to_uppercase(),
            self.limit,
            self.metric
        )];
        lines.extend(self.pools.iter().map(|p| render_row(p, self.cross_chain)));
        lines.join("\n")
    }
}

fn display_name(name: &str) -> String {
    name.chars().take(NAME_WIDTH).collect()
}

/// `• 3pool — vAPY 1.50% · 🎁 3.00% · Vol $250.00k · TVL $1.00M · <link>`
pub fn render_row(pool: &PoolMetric, with_chain: bool) -> String {
    let name = if with_chain {
        format!("[{}] {}", pool.chain, display_name(&pool.name))
    } else {
        display_name(&pool.name)
    };
    format!(
        "• {} — vAPY {} · 🎁 {} · Vol {} · TVL {} · {}",
        name,
        format_pct(Some(pool.base_yield)),
        format_pct(Some(pool.incentive_yield)),
        format_money(Some(pool.volume_24h)),
        format_money(Some(pool.tvl)),
        pool.link
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_pool() -> PoolMetric {
        let mut pool = PoolMetric::new("ethereum", "0xbebc44782c7db0a1a60cb6fe97d0b483032ff1c7");
        pool.name = "3pool".to_string();
        pool.tvl = 1_000_000.0;
        pool.volume_24h = 250_000.0;
        pool.base_yield = 0.015;
        pool.incentive_yield = 0.03;
        pool
    }

    #[test]
    fn test_render_row() {
        let row = render_row(&sample_pool(), false);
        assert!(row.starts_with("• 3pool — "));
        assert!(row.contains("vAPY 1.50%"));
        assert!(row.contains("🎁 3.00%"));
        assert!(row.contains("Vol $250.00k"));
        assert!(row.contains("TVL $1.00M"));
        assert!(render_row(&sample_pool(), true).starts_with("• [ethereum] 3pool"));
    }

    #[test]
    fn test_text_report() {
        let target = QueryTarget::Chain("ethereum".to_string());
        let report = PoolReport::new(&target, SortMetric::Volume, 20, &QueryResult::Ranked(vec![sample_pool()]));
        let text = report.to_text();
        assert!(text.starts_with("ETHEREUM · top 20 by volume\n"));
        assert_eq!(text.lines().count(), 2);

        let empty = PoolReport::new(&target, SortMetric::Volume, 20, &QueryResult::NoData);
        assert_eq!(empty.to_text(), "⚠️ No data for ethereum");
    }

    #[test]
    fn test_json_report() {
        let report = PoolReport::new(
            &QueryTarget::All,
            SortMetric::Tvl,
            5,
            &QueryResult::Ranked(vec![sample_pool()]),
        );
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["metric"], "tvl");
        assert_eq!(json["target"], "all chains");
        assert_eq!(json["pools"][0]["volume24h"], 250_000.0);
        assert_eq!(json["pools"][0]["baseYield"], 0.015);
    }

    #[test]
    fn test_long_names_truncated() {
        let mut pool = sample_pool();
        pool.name = "x".repeat(100);
        let row = render_row(&pool, false);
        assert!(row.starts_with(&format!("• {} —", "x".repeat(NAME_WIDTH))));
    }
}
