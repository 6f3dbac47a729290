//! Canonical-name alias resolution.
//!
//! A curated table of administrative renamings and spelling variants maps
//! normalized names onto the single canonical form used as the join key.
//! The table is process-wide immutable configuration, built once on first
//! use; it is deliberately asymmetric (e.g. boundary files predating the
//! Odisha rename use "orissa", so that spelling is the canonical one).

use std::{collections::HashMap, sync::OnceLock};

use crate::normalize::normalize;

/// Known alternate spellings, keyed by normalized form. Both keys and
/// values must already be normalized (lowercase, ASCII-folded,
/// single-spaced) or lookups can never hit them.
const ALIASES: &[(&str, &str)] = &[
    ("odisha", "orissa"),
    ("uttarakhand", "uttaranchal"),
    ("pondicherry", "puducherry"),
    ("puducherry", "puducherry"),
    ("nct of delhi", "delhi"),
    ("delhi (nct)", "delhi"),
    ("andaman and nicobar islands", "andaman and nicobar"),
    (
        "dadra and nagar haveli and daman and diu",
        "dadra and nagar haveli and daman and diu",
    ),
];

static ALIAS_TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn alias_table() -> &'static HashMap<&'static str, &'static str> {
    ALIAS_TABLE.get_or_init(|| ALIASES.iter().copied().collect())
}

/// Normalizes `raw` and maps it through the alias table, returning the
/// canonical form. Names without an alias entry pass through normalized
/// but otherwise unchanged.
pub fn resolve_alias(raw: &str) -> String {
    let n = normalize(raw);
    match alias_table().get(n.as_str()) {
        Some(canonical) => (*canonical).to_string(),
        None => n,
    }
}
