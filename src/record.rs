//! Fused data model: the owned record types flowing from extraction through
//! linkage to storage.
//!
//! Every span/text field is an owned copy — once assembly finishes, the
//! annotation graphs can be discarded without dangling references.

use serde::{Deserialize, Serialize};

use crate::sentiment::PolarityLabel;

/// A news article with its metadata sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Filename stem shared by the two annotation sources.
    pub name: String,
    /// Raw text from the hierarchical layer.
    pub text: String,
    pub url: String,
    pub publisher: String,
    pub author: String,
}

/// A claim: one sentence-grouped span of claim-tagged tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    /// Reconstructed surface text.
    pub value: String,
    /// 1-based sentence index.
    pub sent_id: u32,
    /// Ordered token identifiers the claim covers.
    pub token_ids: Vec<String>,
}

/// An attribution: who said what, through which cue words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub source: String,
    pub cue: String,
    pub content: String,
    pub sent_id: u32,
}

/// A semantic role binding within a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Role label, e.g. `A0`, `A1`, `AM-TMP`.
    pub label: String,
    /// Term-identifier span of the argument.
    pub span: Vec<String>,
    /// Reconstructed argument text.
    pub text: String,
}

/// A frame-bearing predicate retained by the eligibility gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// The frame label that admitted this predicate.
    pub frame: String,
    /// Evoking-phrase term identifiers.
    pub span: Vec<String>,
    /// Reconstructed evoking-phrase text.
    pub text: String,
    /// Role bindings in declaration order.
    pub roles: Vec<Role>,
    /// Full descendant term-identifier set, for containment joins.
    pub all_terms: Vec<String>,
    /// Discourse position of the predicate node.
    pub order: usize,
    /// Surface gloss carried by the annotation toolchain, if any.
    pub gloss: Option<String>,
    /// Sentence of the evoking phrase.
    pub sent_id: u32,
}

impl Predicate {
    /// Look up a role binding by label.
    pub fn role(&self, label: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.label == label)
    }
}

/// An opinion expression with its target and optional holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub expression: String,
    pub target: String,
    pub holder: Option<String>,
    /// Polarity as annotated (e.g. `positive`, `negative`).
    pub polarity: String,
    pub expression_span: Vec<String>,
    pub target_span: Vec<String>,
    pub holder_span: Vec<String>,
    pub sent_id: u32,
}

impl Opinion {
    /// Term identifiers participating in containment joins: target followed
    /// by expression (the holder does not participate).
    pub fn link_span(&self) -> Vec<String> {
        let mut ids = self.target_span.clone();
        ids.extend(self.expression_span.iter().cloned());
        ids
    }
}

/// An entity mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub value: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub sent_id: u32,
    pub span: Vec<String>,
}

/// An opinion attached to a perspective, with owned text and provenance spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionAttachment {
    pub expression: String,
    pub target: String,
    pub polarity: String,
    pub expression_span: Vec<String>,
    pub target_span: Vec<String>,
}

/// A real-world entity resolved for a perspective's source or target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub value: String,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
}

/// The fused record: a source attributing a statement through a cue, with
/// whatever the secondary joins could attach.
///
/// Immutable once built by the assembler; persisted exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perspective {
    /// Who is speaking.
    pub source: String,
    /// The word(s) signaling the attribution.
    pub cue: String,
    /// The attributed statement (claim- or predicate-derived).
    pub statement: String,
    /// Ordered (term id, word) provenance of the statement.
    pub statement_span: Vec<(String, String)>,
    /// Frame that realized the statement, when a predicate is linked.
    pub frame: Option<String>,
    /// Role bindings, when a predicate is linked.
    pub roles: Option<Vec<Role>>,
    /// Overlapping opinion expressions.
    pub opinions: Vec<OpinionAttachment>,
    /// Lexicon polarity of the statement.
    pub sentiment: Option<PolarityLabel>,
    /// Lexicon polarity of the cue words.
    pub cue_sentiment: Option<PolarityLabel>,
    /// Resolved real-world source entity.
    pub source_entity: Option<ResolvedEntity>,
    /// Resolved real-world target entity.
    pub target_entity: Option<ResolvedEntity>,
    /// Discourse position of the originating predicate.
    pub order: Option<usize>,
    /// Governing sentence.
    pub sent_id: u32,
}
