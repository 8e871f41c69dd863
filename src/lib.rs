//! # newslens
//!
//! A perspective mining engine for dual-annotated news articles. Two
//! independently produced annotation layers — a flat token-tagging stream
//! (claims, attribution spans) and a hierarchical semantic layer (terms,
//! frame predicates, semantic roles, opinions, entities) — are fused into
//! unified *Perspective* records: a source attributing a claim through a
//! cue, linked to the predicate that realizes it, its argument roles, and
//! any overlapping sentiment expression.
//!
//! ## Architecture
//!
//! - **Annotation readers** (`annotation`): the token table and NAF readers
//! - **ID normalizer** (`align`): `w ↔ t` identifier spaces, term lookups
//! - **Span extractor** (`extract`): claims, attributions, frame-gated
//!   predicates, opinions, entities
//! - **Linkers** (`link`): exact span containment + thresholded fuzzy
//!   text similarity
//! - **Sentiment** (`sentiment`): lexicon polarity classification
//! - **Assembler** (`assemble`): span-based and fuzzy pipeline variants
//! - **Storage** (`store`): transactional collaborator (redb or in-memory)
//! - **Batch** (`batch`): directory pairing and per-document processing
//!
//! ## Library usage
//!
//! ```no_run
//! use newslens::batch::{self, BatchOptions};
//! use newslens::store::mem::MemStore;
//! use std::path::Path;
//!
//! let pairs = batch::pair_inputs(Path::new("conll/"), Path::new("naf/")).unwrap();
//! let frames = batch::load_frames(Path::new("sip-frames.txt")).unwrap();
//! let metadata = batch::load_metadata(Path::new("metadata.tsv")).unwrap();
//! let store = MemStore::new();
//! let summary = batch::run(&store, &pairs, &frames, &metadata, &BatchOptions::default()).unwrap();
//! println!("{} perspectives", summary.perspectives);
//! ```

pub mod align;
pub mod annotation;
pub mod assemble;
pub mod batch;
pub mod config;
pub mod detok;
pub mod error;
pub mod extract;
pub mod link;
pub mod record;
pub mod sentiment;
pub mod store;
