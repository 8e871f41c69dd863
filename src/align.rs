//! Identifier-space normalization between the two annotation layers.
//!
//! The flat stream indexes tokens in word space (`w12`) while the semantic
//! layer references term space (`t12`). The two correspond one-to-one by a
//! fixed prefix substitution, so the [`TermIndex`] carries every lookup the
//! extractor and assembler need: term → surface text, term → sentence, and
//! the `w ↔ t` conversion itself. Building the index performs no I/O.
//!
//! A term referenced by the semantic layer but absent from the token stream
//! is a structural mismatch between the sources: lookups return
//! [`AlignError::UnknownTerm`] and the caller skips the offending record
//! rather than failing the document.

use std::collections::HashMap;

use crate::annotation::naf::NafDocument;
use crate::detok;
use crate::error::{AlignError, AlignResult};

/// Convert a word-space identifier to term space (`w12` → `t12`).
pub fn to_term_id(word_id: &str) -> String {
    match word_id.strip_prefix('w') {
        Some(rest) => format!("t{rest}"),
        None => word_id.to_string(),
    }
}

/// Convert a term-space identifier to word space (`t12` → `w12`).
pub fn to_word_id(term_id: &str) -> String {
    match term_id.strip_prefix('t') {
        Some(rest) => format!("w{rest}"),
        None => term_id.to_string(),
    }
}

/// Numeric part of a `w`/`t` identifier, for document-order sorting.
pub fn ordinal(id: &str) -> AlignResult<u64> {
    id.get(1..)
        .and_then(|rest| rest.parse().ok())
        .ok_or_else(|| AlignError::BadIdentifier { id: id.to_string() })
}

/// Term-space lookup tables for one document.
#[derive(Debug, Clone, Default)]
pub struct TermIndex {
    text: HashMap<String, String>,
    sentence: HashMap<String, u32>,
}

impl TermIndex {
    /// Build the index from the hierarchical layer's token stream.
    pub fn build(doc: &NafDocument) -> Self {
        let mut index = TermIndex::default();
        for wf in &doc.tokens {
            let term_id = to_term_id(&wf.id);
            index.sentence.insert(term_id.clone(), wf.sent);
            index.text.insert(term_id, wf.text.clone());
        }
        index
    }

    /// Surface text for a term identifier.
    pub fn text(&self, term_id: &str) -> AlignResult<&str> {
        self.text
            .get(term_id)
            .map(String::as_str)
            .ok_or_else(|| AlignError::UnknownTerm {
                term_id: term_id.to_string(),
            })
    }

    /// Sentence index for a term identifier.
    pub fn sentence(&self, term_id: &str) -> AlignResult<u32> {
        self.sentence
            .get(term_id)
            .copied()
            .ok_or_else(|| AlignError::UnknownTerm {
                term_id: term_id.to_string(),
            })
    }

    /// Surface texts for a span, in the span's order. Fails on the first
    /// identifier the token stream doesn't know.
    pub fn texts<'a>(&'a self, span: &[String]) -> AlignResult<Vec<&'a str>> {
        span.iter().map(|id| self.text(id)).collect()
    }

    /// Space-joined surface text of a span (role arguments and similar
    /// short phrases, where punctuation reassembly doesn't apply).
    pub fn joined_text(&self, span: &[String]) -> AlignResult<String> {
        Ok(self.texts(span)?.join(" "))
    }

    /// Detokenized natural text of a span, in the span's order.
    pub fn phrase(&self, span: &[String]) -> AlignResult<String> {
        Ok(detok::detokenize(self.texts(span)?))
    }

    /// Detokenized natural text of a span sorted into document order.
    pub fn phrase_sorted(&self, span: &[String]) -> AlignResult<String> {
        let mut ids: Vec<&String> = span.iter().collect();
        // Unparseable identifiers sort first; text lookup will report them.
        ids.sort_by_key(|id| ordinal(id.as_str()).unwrap_or(0));
        let texts: AlignResult<Vec<&str>> = ids.into_iter().map(|id| self.text(id)).collect();
        Ok(detok::detokenize(texts?))
    }

    /// Ordered (term id, surface text) pairs for a span in document order.
    pub fn span_words(&self, span: &[String]) -> AlignResult<Vec<(String, String)>> {
        let mut ids: Vec<&String> = span.iter().collect();
        ids.sort_by_key(|id| ordinal(id.as_str()).unwrap_or(0));
        ids.into_iter()
            .map(|id| Ok((id.clone(), self.text(id)?.to_string())))
            .collect()
    }

    /// Number of indexed terms.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Whether the index holds no terms.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
