//! Heuristic field detection for boundary properties and uploaded columns.
//!
//! One philosophy throughout: prefer explicit signal (conventional key or
//! header names), fall back to structural inference over a sample of the
//! data. Every fallback chain is an explicit priority list evaluated top
//! down; coercion probing is a total predicate, not caught panics or
//! parse-and-recover control flow.
//!
//! Check order is fixed: the state column is resolved before the metric
//! candidates, so a dataset that satisfies neither fails with
//! [`ReconcileError::MissingNameColumn`] first.

use geojson::JsonObject;

use crate::error::ReconcileError;

/// Property keys conventionally holding a region name, in preference order.
const NAME_KEY_PREFERENCE: &[&str] = &["name_1", "name", "st_nm", "st_name", "state", "state_name"];

/// Number of leading non-empty values sampled when probing a column for
/// numeric coercibility.
const COERCION_SAMPLE: usize = 20;

/// Picks the boundary property key that holds the region name.
///
/// Preference-list match first (case-insensitive, preference order wins over
/// property order), then the first property whose value looks like a place
/// name, then the first key unconditionally. Returns `None` only for an
/// empty property map.
pub fn detect_region_name_key(props: &JsonObject) -> Option<String> {
    for cand in NAME_KEY_PREFERENCE {
        if let Some(key) = props.keys().find(|k| k.eq_ignore_ascii_case(cand)) {
            return Some(key.clone());
        }
    }
    for (key, value) in props {
        let sval = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        };
        if is_plausible_place_name(&sval) {
            return Some(key.clone());
        }
    }
    props.keys().next().cloned()
}

/// A plausible place name is 3..=39 characters of alphabetic, whitespace,
/// ampersand, or hyphen content.
fn is_plausible_place_name(value: &str) -> bool {
    let len = value.chars().count();
    len > 2
        && len < 40
        && value
            .chars()
            .all(|ch| ch.is_alphabetic() || ch.is_whitespace() || ch == '&' || ch == '-')
}

/// Picks the uploaded column holding state/UT names.
///
/// Any header containing `state` or `ut` (case-insensitive) wins in header
/// order; otherwise the first textual column (one whose sampled values do
/// not all coerce to numbers). With no textual column the pipeline cannot
/// proceed.
pub fn detect_state_column(
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<String, ReconcileError> {
    if let Some(header) = headers.iter().find(|h| {
        let lower = h.to_lowercase();
        lower.contains("state") || lower.contains("ut")
    }) {
        return Ok(header.clone());
    }
    headers
        .iter()
        .enumerate()
        .find(|(idx, _)| !is_numeric_coercible(&column_sample(rows, *idx)))
        .map(|(_, header)| header.clone())
        .ok_or(ReconcileError::MissingNameColumn)
}

/// Lists every column whose sampled values all coerce to `f64`, in header
/// order. An empty candidate list means no metric can be visualized.
pub fn metric_candidates(
    headers: &[String],
    rows: &[Vec<String>],
) -> Result<Vec<String>, ReconcileError> {
    let candidates = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| is_numeric_coercible(&column_sample(rows, *idx)))
        .map(|(_, header)| header.clone())
        .collect::<Vec<_>>();
    if candidates.is_empty() {
        return Err(ReconcileError::MissingMetricColumn);
    }
    Ok(candidates)
}

/// Total coercion predicate: true when the sample is non-empty and every
/// value parses as `f64`. An empty sample carries no evidence and is not
/// coercible.
pub fn is_numeric_coercible(sample: &[&str]) -> bool {
    !sample.is_empty() && sample.iter().all(|v| v.trim().parse::<f64>().is_ok())
}

/// First [`COERCION_SAMPLE`] non-empty values of column `idx`.
fn column_sample<'a>(rows: &'a [Vec<String>], idx: usize) -> Vec<&'a str> {
    rows.iter()
        .filter_map(|row| row.get(idx))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(COERCION_SAMPLE)
        .collect()
}
