//! Schema normalization: heterogeneous upstream items -> canonical contributions

use serde_json::Value;
use tracing::debug;

use crate::shared::errors::FetchError;
use crate::shared::types::{MetricCategory, PoolContribution, PoolMetric, ResponseShape};
use crate::shared::utils::{coerce_f64, is_blank};

use super::pool_merger::merge;

/// Scale of an upstream numeric value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// 0.01 = 1%, or a plain amount
    Fraction,
    /// 1.0 = 1%
    Percent,
}

impl Unit {
    fn apply(self, value: f64) -> f64 {
        match self {
            Unit::Fraction => value,
            Unit::Percent => value / 100.0,
        }
    }
}

/// One acceptable source key. `path` may be dotted (`poolUrls.swap`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceKey {
    pub path: &'static str,
    pub unit: Unit,
}

const fn key(path: &'static str) -> SourceKey {
    SourceKey { path, unit: Unit::Fraction }
}

const fn pct(path: &'static str) -> SourceKey {
    SourceKey { path, unit: Unit::Percent }
}

/// List of reward entries whose rates are summed into the incentive yield
#[derive(Debug, Clone, Copy)]
pub struct RewardList {
    pub path: &'static str,
    pub entry_keys: &'static [SourceKey],
}

/// Per-field priority table for one metric category. An empty key list
/// means the category is not a source for that field.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    pub category: MetricCategory,
    pub address: &'static [SourceKey],
    pub name: &'static [SourceKey],
    pub tvl: &'static [SourceKey],
    pub volume: &'static [SourceKey],
    pub base_yield: &'static [SourceKey],
    pub incentive_yield: &'static [SourceKey],
    pub reward_lists: &'static [RewardList],
    pub link: &'static [SourceKey],
}

const ADDRESS_KEYS: &[SourceKey] = &[
    key("address"),
    key("poolAddress"),
    key("pool"),
    key("lpTokenAddress"),
];
const NAME_KEYS: &[SourceKey] = &[
    key("name"),
    key("poolSymbol"),
    key("symbol"),
    key("lpToken"),
    key("id"),
];
const TVL_KEYS: &[SourceKey] = &[key("tvl"), key("tvlUSD"), key("tvlUsd"), key("usdTotal")];
const VOLUME_KEYS: &[SourceKey] = &[
    key("volume"),
    key("volumeUSD"),
    key("volume24h"),
    key("volumeUsd"),
];
const BASE_YIELD_KEYS: &[SourceKey] = &[
    key("baseApy"),
    key("base_apr"),
    key("apy"),
    key("vAPY"),
    pct("latestDailyApyPcent"),
    pct("latestWeeklyApyPcent"),
];
const INCENTIVE_KEYS: &[SourceKey] = &[
    key("crvApr"),
    key("crvApy"),
    key("crvAprDaily"),
    pct("gaugeCrvApy"),
];
const REWARD_LISTS: &[RewardList] = &[
    RewardList {
        path: "rewards",
        entry_keys: &[key("apy"), key("apr"), key("tAPR")],
    },
    RewardList {
        path: "gaugeRewards",
        entry_keys: &[pct("apy")],
    },
];
const LINK_KEYS: &[SourceKey] = &[
    key("link"),
    key("url"),
    key("poolUrl"),
    key("poolUrls.swap"),
    key("poolUrls.deposit"),
];

/// Pool/metadata feed: authoritative for everything it carries
pub static POOL_FIELDS: FieldTable = FieldTable {
    category: MetricCategory::Pools,
    address: ADDRESS_KEYS,
    name: NAME_KEYS,
    tvl: TVL_KEYS,
    volume: VOLUME_KEYS,
    base_yield: BASE_YIELD_KEYS,
    incentive_yield: INCENTIVE_KEYS,
    reward_lists: REWARD_LISTS,
    link: LINK_KEYS,
};

/// Volume feed: volume only
pub static VOLUME_FIELDS: FieldTable = FieldTable {
    category: MetricCategory::Volume,
    address: ADDRESS_KEYS,
    name: &[],
    tvl: &[],
    volume: VOLUME_KEYS,
    base_yield: &[],
    incentive_yield: &[],
    reward_lists: &[],
    link: &[],
};

/// Base-yield feed: base yield only
pub static BASE_YIELD_FIELDS: FieldTable = FieldTable {
    category: MetricCategory::BaseYield,
    address: ADDRESS_KEYS,
    name: &[],
    tvl: &[],
    volume: &[],
    base_yield: BASE_YIELD_KEYS,
    incentive_yield: &[],
    reward_lists: &[],
    link: &[],
};

impl FieldTable {
    pub fn for_category(category: MetricCategory) -> &'static FieldTable {
        match category {
            MetricCategory::Pools => &POOL_FIELDS,
            MetricCategory::Volume => &VOLUME_FIELDS,
            MetricCategory::BaseYield => &BASE_YIELD_FIELDS,
        }
    }
}

/// Container paths tried, in order, to find the item array of a payload.
/// `""` is the payload root.
fn item_paths(shape: ResponseShape) -> &'static [&'static str] {
    match shape {
        ResponseShape::PoolList => &["data.poolData", "data.poolDetails", "data", "poolDetails", "apys", ""],
        ResponseShape::VolumeList => &["data.pools", "data.poolList", "data.volumes", "data", "pools", ""],
        ResponseShape::ApyList => &["data.baseApys", "data.apys", "data.poolDetails", "apys", "data", ""],
    }
}

fn lookup<'a>(raw: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(raw);
    }
    path.split('.')
        .try_fold(raw, |current, segment| current.get(segment))
        .filter(|v| !is_blank(v))
}

/// Arrays of scalars (`[min, max]`, url lists) resolve to their first element
fn scalar(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first().filter(|v| !is_blank(v)),
        other => Some(other),
    }
}

/// First present, non-blank, coercible value among `keys`
pub fn resolve_number(raw: &Value, keys: &[SourceKey]) -> Option<f64> {
    keys.iter().find_map(|k| {
        lookup(raw, k.path)
            .and_then(scalar)
            .and_then(coerce_f64)
            .map(|v| k.unit.apply(v))
    })
}

/// First present, non-empty textual value among `keys`
pub fn resolve_text(raw: &Value, keys: &[SourceKey]) -> Option<String> {
    keys.iter().find_map(|k| {
        match lookup(raw, k.path).and_then(scalar)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}

fn resolve_incentive(raw: &Value, table: &FieldTable) -> Option<f64> {
    let mut found = false;
    let mut total = 0.0;

    if let Some(v) = resolve_number(raw, table.incentive_yield) {
        found = true;
        total += v;
    }
    for list in table.reward_lists {
        let Some(Value::Array(entries)) = lookup(raw, list.path) else {
            continue;
        };
        for entry in entries {
            if let Some(v) = resolve_number(entry, list.entry_keys) {
                found = true;
                total += v;
            }
        }
    }

    found.then_some(total)
}

/// Result of normalizing one payload
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub contributions: Vec<PoolContribution>,
    /// Items dropped: not an object, or no identifier
    pub skipped: usize,
}

/// Maps upstream items onto the canonical fields of one metric category
#[derive(Debug, Clone, Copy)]
pub struct SchemaNormalizer {
    table: &'static FieldTable,
}

impl SchemaNormalizer {
    pub fn new(table: &'static FieldTable) -> Self {
        Self { table }
    }

    pub fn for_category(category: MetricCategory) -> Self {
        Self::new(FieldTable::for_category(category))
    }

    pub fn category(&self) -> MetricCategory {
        self.table.category
    }

    /// Normalize one item. `None` when it carries no identifier.
    pub fn normalize_item(&self, raw: &Value) -> Option<PoolContribution> {
        if !raw.is_object() {
            return None;
        }
        let table = self.table;
        let address = resolve_text(raw, table.address)?;

        let mut contribution = PoolContribution::new(&address);
        contribution.name = resolve_text(raw, table.name);
        contribution.tvl = resolve_number(raw, table.tvl).map(|v| v.max(0.0));
        contribution.volume_24h = resolve_number(raw, table.volume).map(|v| v.max(0.0));
        contribution.base_yield = resolve_number(raw, table.base_yield);
        contribution.incentive_yield = resolve_incentive(raw, table);
        contribution.link = resolve_text(raw, table.link);
        Some(contribution)
    }

    /// Locate the item array for `shape` and normalize every item in it.
    /// An unrecognized layout or an empty list is a malformed payload.
    pub fn normalize_payload(&self, payload: &Value, shape: ResponseShape) -> Result<NormalizedBatch, FetchError> {
        let items = item_paths(shape)
            .iter()
            .filter_map(|path| lookup(payload, path))
            .find_map(|v| v.as_array().filter(|items| !items.is_empty()))
            .ok_or_else(|| FetchError::MalformedPayload(format!("no {:?} items found", shape)))?;

        let mut batch = NormalizedBatch::default();
        for item in items {
            match self.normalize_item(item) {
                Some(contribution) => batch.contributions.push(contribution),
                None => {
                    batch.skipped += 1;
                    debug!("Skipping {} item without identifier", self.category());
                }
            }
        }

        if batch.contributions.is_empty() {
            return Err(FetchError::MalformedPayload(format!(
                "all {} items lacked an identifier",
                batch.skipped
            )));
        }
        Ok(batch)
    }
}

/// Normalize a single pool-feed item into a full record with defaults
pub fn normalize(chain: &str, raw: &Value) -> Option<PoolMetric> {
    SchemaNormalizer::new(&POOL_FIELDS)
        .normalize_item(raw)
        .map(|contribution| merge(chain, None, &contribution))
}
