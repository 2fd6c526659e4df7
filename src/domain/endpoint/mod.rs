//! Endpoint domain - upstream source locations per chain and metric category

mod endpoint_registry;

pub use endpoint_registry::{default_candidates, EndpointRegistry};

use serde::{Deserialize, Serialize};

use crate::shared::types::{MetricCategory, ResponseShape};

/// Placeholder substituted with the chain identifier in URL templates
pub const CHAIN_PLACEHOLDER: &str = "{chain}";

/// Preference tier. Ordering of the variants is the resolver's ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointTier {
    /// Primary aggregator API
    Primary,
    /// Legacy or mirror domain
    Mirror,
    /// Experimental per-registry endpoint
    Experimental,
}

/// One upstream location tried for a chain/category, in preference order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    /// URL or URL template containing `{chain}`
    pub url: String,
    pub category: MetricCategory,
    pub shape: ResponseShape,
    pub tier: EndpointTier,
    /// Restrict to one chain; `None` applies to every configured chain
    #[serde(default)]
    pub chain: Option<String>,
}

impl EndpointCandidate {
    pub fn new(url: &str, category: MetricCategory, shape: ResponseShape, tier: EndpointTier) -> Self {
        Self {
            url: url.to_string(),
            category,
            shape,
            tier,
            chain: None,
        }
    }

    pub fn for_chain(mut self, chain: &str) -> Self {
        self.chain = Some(chain.to_lowercase());
        self
    }

    pub fn applies_to(&self, chain: &str) -> bool {
        match &self.chain {
            Some(scope) => scope.eq_ignore_ascii_case(chain),
            None => true,
        }
    }

    /// Concrete candidate for `chain` with the template rendered
    pub fn resolve(&self, chain: &str) -> Self {
        Self {
            url: self.url.replace(CHAIN_PLACEHOLDER, chain),
            category: self.category,
            shape: self.shape,
            tier: self.tier,
            chain: Some(chain.to_string()),
        }
    }
}
