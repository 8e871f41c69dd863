//! Annotation readers for the two input layers.
//!
//! Each document arrives as two independently produced annotation sources
//! sharing a filename stem:
//!
//! - [`conll::TokenTable`] — the flat, sentence/token-indexed tagging stream
//!   (claims, attribution field tags, per-token identifiers)
//! - [`naf::NafDocument`] — the hierarchical semantic layer (tokens, terms,
//!   predicates with semantic roles and frame references, opinions, entities)
//!
//! Both readers produce owned, read-only value structures. They are never
//! merged in place; the extractor consumes them side by side through the
//! [`crate::align::TermIndex`].

pub mod conll;
pub mod naf;

/// Placeholder used for absent cell values in the flat tagging stream.
pub const PLACEHOLDER: &str = "-";

/// Whether a text field is empty or the annotation placeholder.
pub fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == PLACEHOLDER
}
