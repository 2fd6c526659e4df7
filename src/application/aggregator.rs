//! Per-chain pipeline: resolve -> fetch -> normalize -> merge

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::endpoint::EndpointRegistry;
use crate::domain::pool::{CategoryReport, ChainSnapshot, SchemaNormalizer};
use crate::infrastructure::http::Fetcher;
use crate::shared::errors::PipelineError;
use crate::shared::types::{MetricCategory, PoolMetric};

/// Runs one pipeline per chain. Cheap to clone; clones share the registry
/// and the HTTP connection pools.
#[derive(Clone)]
pub struct Aggregator {
    registry: Arc<EndpointRegistry>,
    fetcher: Fetcher,
}

impl Aggregator {
    pub fn new(registry: EndpointRegistry, fetcher: Fetcher) -> Self {
        Self {
            registry: Arc::new(registry),
            fetcher,
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Merged, unfiltered, unranked snapshot for one chain. Never fails:
    /// exhausted categories are recorded on the snapshot.
    pub async fn snapshot(&self, chain: &str) -> ChainSnapshot {
        let chain = chain.trim().to_lowercase();
        let mut snapshot = ChainSnapshot::new(&chain);

        if !self.registry.is_supported(&chain) {
            warn!("⚠️ {}: chain not configured", chain);
            for category in MetricCategory::ALL {
                snapshot.record(CategoryReport {
                    category,
                    source: None,
                    attempts: 0,
                    merged: 0,
                    skipped: 0,
                    tls_fallback: false,
                    error: Some(PipelineError::UnknownChain(chain.clone())),
                });
            }
            return snapshot;
        }

        for category in MetricCategory::ALL {
            self.run_category(&mut snapshot, category).await;
        }

        if snapshot.is_empty() {
            warn!("❌ {}: nothing found", chain);
        } else {
            info!("📊 {}: {} pools merged", chain, snapshot.len());
        }
        snapshot
    }

    /// Pools of one chain's snapshot
    pub async fn snapshot_pools(&self, chain: &str) -> Vec<PoolMetric> {
        self.snapshot(chain).await.into_pools()
    }

    /// Concurrent per-chain snapshots concatenated in `chains` order. A chain
    /// with no data contributes nothing and does not affect the others.
    pub async fn cross_chain_snapshot(&self, chains: &[String]) -> Vec<PoolMetric> {
        let mut unique: Vec<String> = Vec::new();
        for chain in chains {
            let chain = chain.trim().to_lowercase();
            if !unique.contains(&chain) {
                unique.push(chain);
            }
        }

        let snapshots = join_all(unique.iter().map(|chain| self.snapshot(chain))).await;
        snapshots.into_iter().flat_map(ChainSnapshot::into_pools).collect()
    }

    /// Try candidates in order, stop at the first usable payload
    async fn run_category(&self, snapshot: &mut ChainSnapshot, category: MetricCategory) {
        let chain = snapshot.chain.clone();
        let candidates = self.registry.candidates(&chain, category);
        let normalizer = SchemaNormalizer::for_category(category);
        let mut attempts = 0;

        for candidate in &candidates {
            attempts += 1;
            debug!("{} {}: trying {} ({:?})", chain, category, candidate.url, candidate.tier);

            let payload = match self.fetcher.fetch(candidate).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("[..] {} {}: fetch fail {}: {}", chain, category, candidate.url, e);
                    continue;
                }
            };

            let batch = match normalizer.normalize_payload(&payload.body, candidate.shape) {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("[..] {} {}: unusable payload at {}: {}", chain, category, candidate.url, e);
                    continue;
                }
            };

            let merged = snapshot.apply_all(&batch.contributions);
            info!(
                "✅ {} {}: {} -> {} pools ({} skipped)",
                chain, category, payload.url, merged, batch.skipped
            );
            snapshot.record(CategoryReport {
                category,
                source: Some(payload.url),
                attempts,
                merged,
                skipped: batch.skipped,
                tls_fallback: payload.tls_fallback,
                error: None,
            });
            return;
        }

        warn!("❌ {} {}: all {} candidates exhausted", chain, category, attempts);
        snapshot.record(CategoryReport::exhausted(&chain, category, attempts));
    }
}
