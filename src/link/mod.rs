//! Record linkage across the two annotation layers.
//!
//! Two join strategies, chosen by whether the record kinds share an
//! identifier space:
//!
//! - [`exact`] — span-containment joins where term identifiers permit
//!   (predicate ↔ opinion): pure set containment, no threshold, no
//!   ambiguity.
//! - [`fuzzy`] — approximate text-similarity joins for everything else
//!   (claim ↔ attribution and the best-effort secondary pairings):
//!   normalized edit distance in [0,100] with a strict threshold and
//!   first-wins best-match selection.
//!
//! A join that finds nothing is a normal "no attachment" outcome, never an
//! error; both linkers express it as an absent `Option`/empty result.

pub mod exact;
pub mod fuzzy;
