//! Exact linker: span-containment joins over shared term identifiers.

use std::collections::HashSet;

use crate::record::{Opinion, Predicate};

/// Whether every identifier in `span` occurs in `within`. An empty span is
/// never contained — a vacuous subset must not create an attachment.
pub fn is_contained(span: &[String], within: &HashSet<&str>) -> bool {
    !span.is_empty() && span.iter().all(|id| within.contains(id.as_str()))
}

/// The opinions whose target/expression term set is a subset of the
/// predicate's descendant term set. Deterministic and one-to-many: one
/// predicate may carry several opinions; input order is preserved.
pub fn linked_opinions<'a>(predicate: &Predicate, opinions: &'a [Opinion]) -> Vec<&'a Opinion> {
    let within: HashSet<&str> = predicate.all_terms.iter().map(String::as_str).collect();
    opinions
        .iter()
        .filter(|op| is_contained(&op.link_span(), &within))
        .collect()
}
