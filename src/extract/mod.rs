//! Span extraction: pulling structured candidate records out of the two
//! annotation layers.
//!
//! Four independent extraction families, each scanning one layer for a
//! specific tag family:
//!
//! - [`attribution::attributions`] — decode `B-content` tag labels and
//!   regroup the tagged rows into {source, cue, content} fields
//! - [`claim::claims`] — group claim-tagged rows by sentence
//! - [`predicate::predicates`] — frame-gated SRL predicates with their
//!   role map and descendant term set
//! - [`opinion::opinions`] / [`opinion::entities`] — opinion expressions
//!   (targetless ones dropped) and entity mentions
//!
//! Extraction is lossy by design: records the two layers disagree on are
//! skipped with a diagnostic, never failing the document.

pub mod attribution;
pub mod claim;
pub mod opinion;
pub mod predicate;

pub use attribution::attributions;
pub use claim::claims;
pub use opinion::{entities, opinions};
pub use predicate::predicates;
