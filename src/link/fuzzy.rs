//! Fuzzy linker: approximate string-similarity record linkage.
//!
//! Used only where the two record kinds share no identifier space. For a
//! left collection and a right collection, with one designated text field
//! on each side: score every left/right pair with a normalized
//! edit-distance similarity in [0,100], retain candidates strictly above
//! the threshold, and keep the single best per left record. Exact score
//! ties keep the first-encountered right record. Placeholder or empty
//! field values are skipped on both sides. A left record with no candidate
//! above the threshold simply produces no match.
//!
//! Matches carry the *indices* of both records, so downstream
//! cross-referencing joins on stable positions rather than text values —
//! two records with identical text can never cross wires.

use crate::annotation::is_placeholder;

/// Default similarity threshold.
pub const DEFAULT_THRESHOLD: f64 = 90.0;
/// Stricter threshold used by the attribution-side pairings.
pub const STRICT_THRESHOLD: f64 = 95.0;

/// One resolved left→right match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatch {
    /// Index into the left collection.
    pub left: usize,
    /// Index into the right collection.
    pub right: usize,
    /// Similarity score in (threshold, 100].
    pub score: f64,
}

/// Normalized edit-distance similarity scaled to [0,100].
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Best right-side match for one text, or `None` when nothing clears the
/// threshold.
pub fn best_match<'a, I>(left_text: &str, rights: I, threshold: f64) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = (usize, &'a str)>,
{
    if is_placeholder(left_text) {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (idx, right_text) in rights {
        if is_placeholder(right_text) {
            continue;
        }
        let score = similarity(left_text, right_text);
        if score <= threshold {
            continue;
        }
        // Strictly-greater keeps the first-encountered record on a tie.
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((idx, score));
        }
    }
    best
}

/// Join two collections on designated text fields: at most one match per
/// left record.
pub fn link_all<L, R>(
    lefts: &[L],
    rights: &[R],
    left_text: impl Fn(&L) -> &str,
    right_text: impl Fn(&R) -> &str,
    threshold: f64,
) -> Vec<FuzzyMatch> {
    let mut matches = Vec::new();
    for (left, record) in lefts.iter().enumerate() {
        let candidates = rights.iter().enumerate().map(|(i, r)| (i, right_text(r)));
        if let Some((right, score)) = best_match(left_text(record), candidates, threshold) {
            matches.push(FuzzyMatch { left, right, score });
        }
    }
    matches
}
