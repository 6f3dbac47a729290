//! Reconciliation of aggregated metrics against boundary regions.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;

use crate::boundary::Region;

/// Regions annotated with their metric, plus the advisory list of canonical
/// names that were uploaded but match no boundary region.
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    pub regions: Vec<Region>,
    pub unmatched: Vec<String>,
}

/// Attaches an aggregated metric value to every region (0.0 when the
/// canonical name has no aggregate entry, so no region is left undefined)
/// and reports uploaded canonical names absent from the boundary set,
/// sorted for reproducible display.
///
/// Empty inputs are valid: zero regions yields an unmatched list covering
/// the whole aggregate; an empty aggregate yields fully-zeroed regions.
pub fn reconcile(regions: &[Region], totals: &BTreeMap<String, f64>) -> ReconciliationResult {
    let region_names: HashSet<&str> = regions
        .iter()
        .map(|region| region.canonical_name.as_str())
        .collect();

    let annotated = regions
        .iter()
        .map(|region| Region {
            metric_value: totals.get(&region.canonical_name).copied().unwrap_or(0.0),
            ..region.clone()
        })
        .collect();

    // BTreeMap iteration is already name-ordered.
    let unmatched = totals
        .keys()
        .filter(|name| !region_names.contains(name.as_str()))
        .cloned()
        .collect();

    ReconciliationResult {
        regions: annotated,
        unmatched,
    }
}

/// Ranked display table: (raw name, metric) pairs sorted by metric
/// descending, raw name as the tie-break.
pub fn ranked_table(regions: &[Region]) -> Vec<(String, f64)> {
    regions
        .iter()
        .map(|region| (region.raw_name.clone(), region.metric_value))
        .sorted_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}
