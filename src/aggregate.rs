//! Per-canonical-name metric aggregation over uploaded rows.

use std::collections::BTreeMap;

use crate::alias::resolve_alias;

/// Groups rows by canonical state name and sums the metric column.
///
/// Cells that are missing or fail numeric parsing contribute 0.0 to their
/// group; a bad cell never aborts the aggregation. The `BTreeMap` keeps the
/// output in canonical-name order, so repeated runs over the same multiset
/// of rows display identically.
pub fn aggregate(
    rows: &[Vec<String>],
    state_idx: usize,
    metric_idx: usize,
) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for row in rows {
        let raw_name = row.get(state_idx).map(|s| s.trim()).unwrap_or_default();
        let canonical = resolve_alias(raw_name);
        let metric = row
            .get(metric_idx)
            .and_then(|cell| cell.trim().parse::<f64>().ok())
            .unwrap_or(0.0);
        *totals.entry(canonical).or_insert(0.0) += metric;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[(&str, &str)]) -> Vec<Vec<String>> {
        data.iter()
            .map(|(name, value)| vec![name.to_string(), value.to_string()])
            .collect()
    }

    #[test]
    fn aliased_spellings_sum_into_one_group() {
        let data = rows(&[("Odisha", "10"), ("Orissa", "5"), ("Kerala", "3")]);
        let totals = aggregate(&data, 0, 1);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["orissa"], 15.0);
        assert_eq!(totals["kerala"], 3.0);
    }

    #[test]
    fn unparseable_metric_cells_count_as_zero() {
        let data = rows(&[("Goa", "7"), ("Goa", "n/a"), ("Goa", "")]);
        let totals = aggregate(&data, 0, 1);
        assert_eq!(totals["goa"], 7.0);
    }

    #[test]
    fn empty_input_produces_no_entries() {
        let totals = aggregate(&[], 0, 1);
        assert!(totals.is_empty());
    }

    #[test]
    fn output_iterates_in_canonical_name_order() {
        let data = rows(&[("Kerala", "1"), ("Assam", "2"), ("Goa", "3")]);
        let keys = aggregate(&data, 0, 1).into_keys().collect::<Vec<_>>();
        assert_eq!(keys, vec!["assam", "goa", "kerala"]);
    }
}
