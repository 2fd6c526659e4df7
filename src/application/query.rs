//! Downstream query surface: chain-or-all, metric, limit, filters -> ranked pools

use std::fmt;
use std::str::FromStr;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::application::aggregator::Aggregator;
use crate::config::Config;
use crate::domain::endpoint::EndpointRegistry;
use crate::domain::pool::{PoolRanker, SelectFilters};
use crate::infrastructure::http::Fetcher;
use crate::shared::errors::AppError;
use crate::shared::types::{PoolMetric, SortMetric};

/// One chain or the union of every configured chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    Chain(String),
    All,
}

impl FromStr for QueryTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "" => Err(anyhow::anyhow!("Empty query target")),
            "all" => Ok(QueryTarget::All),
            _ => Ok(QueryTarget::Chain(s)),
        }
    }
}

impl fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryTarget::Chain(chain) => f.write_str(chain),
            QueryTarget::All => f.write_str("all chains"),
        }
    }
}

/// Ranked result, or an explicit marker that nothing survived
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Ranked(Vec<PoolMetric>),
    NoData,
}

impl QueryResult {
    pub fn pools(&self) -> &[PoolMetric] {
        match self {
            QueryResult::Ranked(pools) => pools,
            QueryResult::NoData => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QueryResult::NoData)
    }
}

/// Stateless between calls: every query re-fetches live data
#[derive(Clone)]
pub struct PoolQueryService {
    aggregator: Aggregator,
    ranker: PoolRanker,
    default_limit: usize,
    default_filters: SelectFilters,
}

impl PoolQueryService {
    pub fn new(aggregator: Aggregator, ranker: PoolRanker, default_limit: usize, default_filters: SelectFilters) -> Self {
        Self {
            aggregator,
            ranker,
            default_limit: ranker.clamp_limit(default_limit),
            default_filters,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, AppError> {
        let registry = EndpointRegistry::with_defaults(cfg.chains.clone(), cfg.endpoints.clone());
        let fetcher = Fetcher::with_timeout(cfg.request_timeout(), cfg.insecure_tls)?;
        Ok(Self::new(
            Aggregator::new(registry, fetcher),
            PoolRanker::new(cfg.query.max_limit),
            cfg.query.default_limit,
            cfg.filters.to_filters(),
        ))
    }

    pub fn chains(&self) -> &[String] {
        self.aggregator.registry().chains()
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    pub fn default_filters(&self) -> SelectFilters {
        self.default_filters
    }

    pub fn max_limit(&self) -> usize {
        self.ranker.max_limit()
    }

    pub async fn query(
        &self,
        target: &QueryTarget,
        metric: SortMetric,
        limit: usize,
        filters: &SelectFilters,
    ) -> QueryResult {
        let query_id = Uuid::new_v4();
        let span = info_span!("query", %query_id, scope = %target, %metric);

        async {
            let records = match target {
                QueryTarget::Chain(chain) => self.aggregator.snapshot_pools(chain).await,
                QueryTarget::All => self.aggregator.cross_chain_snapshot(self.chains()).await,
            };
            let fetched = records.len();
            let ranked = self.ranker.select(records, metric, limit, filters);
            info!("🎯 {} pools fetched, {} returned", fetched, ranked.len());

            if ranked.is_empty() {
                QueryResult::NoData
            } else {
                QueryResult::Ranked(ranked)
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregator::tests::{aggregator, script_healthy_chain};
    use crate::infrastructure::http::testing::ScriptedTransport;
    use std::sync::Arc;

    fn service(transport: Arc<ScriptedTransport>) -> PoolQueryService {
        PoolQueryService::new(aggregator(transport), PoolRanker::new(10), 5, SelectFilters::default())
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!("ALL".parse::<QueryTarget>().unwrap(), QueryTarget::All);
        assert_eq!(
            " Ethereum ".parse::<QueryTarget>().unwrap(),
            QueryTarget::Chain("ethereum".to_string())
        );
        assert!("  ".parse::<QueryTarget>().is_err());
    }

    #[tokio::test]
    async fn test_chain_query_ranks_by_metric() {
        let transport = Arc::new(ScriptedTransport::new());
        script_healthy_chain(&transport, "alpha");

        let result = service(transport)
            .query(&QueryTarget::Chain("alpha".to_string()), SortMetric::Volume, 10, &SelectFilters::default())
            .await;

        let names: Vec<&str> = result.pools().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["tricrypto", "3pool"]);
    }

    #[tokio::test]
    async fn test_failed_chain_is_no_data() {
        let transport = Arc::new(ScriptedTransport::new());
        let result = service(transport)
            .query(&QueryTarget::Chain("alpha".to_string()), SortMetric::Tvl, 10, &SelectFilters::default())
            .await;
        assert_eq!(result, QueryResult::NoData);
        assert!(result.pools().is_empty());
    }

    #[tokio::test]
    async fn test_all_target_ranks_globally() {
        let transport = Arc::new(ScriptedTransport::new());
        script_healthy_chain(&transport, "alpha");
        script_healthy_chain(&transport, "beta");

        let result = service(transport)
            .query(&QueryTarget::All, SortMetric::Tvl, 3, &SelectFilters::default())
            .await;

        let pools = result.pools();
        assert_eq!(pools.len(), 3);
        // equal TVLs keep chain order
        assert_eq!(pools[0].chain, "alpha");
        assert_eq!(pools[1].chain, "beta");
        assert_eq!(pools[0].tvl, 1_000_000.0);
        assert_eq!(pools[2].tvl, 500_000.0);
    }

    #[tokio::test]
    async fn test_filters_can_empty_the_result() {
        let transport = Arc::new(ScriptedTransport::new());
        script_healthy_chain(&transport, "alpha");

        let filters = SelectFilters { min_tvl: Some(10_000_000.0), suppress_inactive: true };
        let result = service(transport)
            .query(&QueryTarget::Chain("alpha".to_string()), SortMetric::Volume, 10, &filters)
            .await;
        assert!(result.is_empty());
    }

    #[test]
    fn test_default_limit_is_clamped() {
        let transport = Arc::new(ScriptedTransport::new());
        let service = PoolQueryService::new(aggregator(transport), PoolRanker::new(10), 500, SelectFilters::none());
        assert_eq!(service.default_limit(), 10);
        assert_eq!(service.max_limit(), 10);
        assert_eq!(service.chains(), &["alpha".to_string(), "beta".to_string()]);
    }
}
