//! Text normalization for region names.
//!
//! Every name that enters the pipeline (boundary feature properties and
//! uploaded CSV cells alike) passes through [`normalize`] before any
//! comparison. Canonical names are the only join key between the two
//! universes, so the folding rules here define what "the same state" means.

use unicode_normalization::UnicodeNormalization;

/// Canonicalizes a raw name string.
///
/// Applies, in order: NFKD compatibility decomposition with all non-ASCII
/// characters dropped (diacritic folding), `&` replaced by the word `and`,
/// whitespace collapsed to single spaces and trimmed, and lower-casing.
///
/// Total and idempotent; an empty or all-whitespace input yields `""`.
pub fn normalize(raw: &str) -> String {
    let folded = raw
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .replace('&', "and");
    folded
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// [`normalize`] lifted over missing input: `None` yields `""`.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}
