//! Endpoint registry: chain allow-list plus the ordered candidate table

use super::{EndpointCandidate, EndpointTier};
use crate::shared::types::{MetricCategory, ResponseShape};

const POOL_REGISTRIES: [&str; 4] = ["main", "crypto", "factory", "factory-crypto"];
const MIRROR_POOL_REGISTRIES: [&str; 3] = ["main", "crypto", "factory"];

/// Built-in candidate table. Declaration order is the preference order
/// inside a tier.
pub fn default_candidates() -> Vec<EndpointCandidate> {
    use EndpointTier::*;
    use MetricCategory as C;
    use ResponseShape as S;

    let mut candidates = Vec::new();

    // Пулы: основной API
    for registry in POOL_REGISTRIES {
        candidates.push(EndpointCandidate::new(
            &format!("https://api.curve.finance/api/getPools/{{chain}}/{}", registry),
            C::Pools,
            S::PoolList,
            Primary,
        ));
    }
    for registry in ["factory-tricrypto", "factory-crvusd"] {
        candidates.push(
            EndpointCandidate::new(
                &format!("https://api.curve.finance/api/getPools/{{chain}}/{}", registry),
                C::Pools,
                S::PoolList,
                Primary,
            )
            .for_chain("ethereum"),
        );
    }
    // Пулы: старый домен
    for registry in MIRROR_POOL_REGISTRIES {
        candidates.push(EndpointCandidate::new(
            &format!("https://api.curve.fi/api/getPools/{{chain}}/{}", registry),
            C::Pools,
            S::PoolList,
            Mirror,
        ));
    }
    candidates.push(EndpointCandidate::new(
        "https://api.curve.finance/v1/getFactoryAPYs/{chain}/1",
        C::Pools,
        S::PoolList,
        Experimental,
    ));
    candidates.push(EndpointCandidate::new(
        "https://api.curve.fi/api/getFactoryAPYs?chain={chain}",
        C::Pools,
        S::PoolList,
        Experimental,
    ));

    candidates.push(EndpointCandidate::new(
        "https://api.curve.finance/v1/getBaseApys/{chain}",
        C::BaseYield,
        S::ApyList,
        Primary,
    ));
    candidates.push(EndpointCandidate::new(
        "https://api.curve.fi/api/getBaseApys/{chain}",
        C::BaseYield,
        S::ApyList,
        Mirror,
    ));

    candidates.push(EndpointCandidate::new(
        "https://api.curve.finance/v1/getVolumes/{chain}",
        C::Volume,
        S::VolumeList,
        Primary,
    ));
    candidates.push(EndpointCandidate::new(
        "https://api.curve.fi/api/getSubgraphData/{chain}",
        C::Volume,
        S::VolumeList,
        Mirror,
    ));
    candidates.push(EndpointCandidate::new(
        "https://api.curve.finance/v1/getSubgraphData/{chain}",
        C::Volume,
        S::VolumeList,
        Experimental,
    ));

    candidates
}

/// Resolves ordered candidates for a chain and metric category.
/// Pure configuration: no I/O, no interior mutability.
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    chains: Vec<String>,
    candidates: Vec<EndpointCandidate>,
}

impl EndpointRegistry {
    pub fn new(chains: Vec<String>, candidates: Vec<EndpointCandidate>) -> Self {
        Self {
            chains: chains.into_iter().map(|c| c.trim().to_lowercase()).collect(),
            candidates,
        }
    }

    /// Built-in table followed by `extra` candidates from configuration
    pub fn with_defaults(chains: Vec<String>, extra: Vec<EndpointCandidate>) -> Self {
        let mut candidates = default_candidates();
        candidates.extend(extra);
        Self::new(chains, candidates)
    }

    pub fn chains(&self) -> &[String] {
        &self.chains
    }

    pub fn is_supported(&self, chain: &str) -> bool {
        self.chains.iter().any(|c| c.eq_ignore_ascii_case(chain.trim()))
    }

    /// Ordered candidates, most preferred first. Unknown chains yield an
    /// empty list.
    pub fn candidates(&self, chain: &str, category: MetricCategory) -> Vec<EndpointCandidate> {
        let chain = chain.trim().to_lowercase();
        if !self.is_supported(&chain) {
            return Vec::new();
        }

        let mut resolved: Vec<EndpointCandidate> = self
            .candidates
            .iter()
            .filter(|c| c.category == category && c.applies_to(&chain))
            .map(|c| c.resolve(&chain))
            .collect();
        // stable: declaration order survives inside a tier
        resolved.sort_by_key(|c| c.tier);
        resolved
    }
}
