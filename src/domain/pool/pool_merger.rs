//! Field-by-field merge of partial contributions into canonical records

use crate::shared::types::{PoolContribution, PoolMetric};

fn overwrite_number(target: &mut f64, incoming: Option<f64>) {
    if let Some(v) = incoming {
        // a zero from one feed never erases another feed's figure
        if v != 0.0 {
            *target = v;
        }
    }
}

fn overwrite_text(target: &mut String, incoming: &Option<String>) {
    if let Some(v) = incoming {
        if !v.trim().is_empty() {
            *target = v.clone();
        }
    }
}

/// Apply `contribution` onto `existing`. Supplied non-default fields win,
/// absent fields leave the record untouched.
pub fn merge_into(existing: &mut PoolMetric, contribution: &PoolContribution) {
    overwrite_text(&mut existing.name, &contribution.name);
    overwrite_number(&mut existing.tvl, contribution.tvl);
    overwrite_number(&mut existing.volume_24h, contribution.volume_24h);
    overwrite_number(&mut existing.base_yield, contribution.base_yield);
    overwrite_number(&mut existing.incentive_yield, contribution.incentive_yield);
    overwrite_text(&mut existing.link, &contribution.link);
}

/// Merge into `existing`, or into a fresh defaulted record for `chain`
pub fn merge(chain: &str, existing: Option<PoolMetric>, contribution: &PoolContribution) -> PoolMetric {
    let mut record = existing.unwrap_or_else(|| PoolMetric::new(chain, &contribution.address));
    merge_into(&mut record, contribution);
    record
}
