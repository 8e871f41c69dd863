//! Reader for the hierarchical semantic layer (NAF/KAF XML).
//!
//! Single pass over the event stream, building an owned object graph:
//! raw text, word forms, terms, SRL predicates (evoking span, ordered roles,
//! external frame references, discourse order), opinions, and entities.
//!
//! A few NAF quirks the parser has to honor:
//!
//! - `<target>` elements appear under term spans, predicate spans, role
//!   spans, opinion sub-elements, and entity references; routing depends on
//!   the enclosing context, and a predicate's descendant set spans both its
//!   own span and every role span.
//! - the annotation toolchain emits the covered surface text as an XML
//!   comment immediately preceding each predicate and inside each entity's
//!   `<references>`; those comments are the only place the entity surface
//!   value exists.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{AnnotationError, AnnotationResult};

/// A word form from the token layer.
#[derive(Debug, Clone)]
pub struct WordForm {
    /// Word-space identifier, e.g. `w12`.
    pub id: String,
    /// 1-based sentence index.
    pub sent: u32,
    /// Surface text.
    pub text: String,
}

/// A term node: term-space identifier plus the word-form span it covers.
#[derive(Debug, Clone)]
pub struct TermNode {
    /// Term-space identifier, e.g. `t12`.
    pub id: String,
    /// Covered word-form identifiers.
    pub span: Vec<String>,
}

/// An external reference attached to a predicate.
#[derive(Debug, Clone)]
pub struct ExternalRef {
    /// Resource name, e.g. `FrameNet`.
    pub resource: String,
    /// Reference label within the resource, e.g. `Statement`.
    pub reference: String,
}

/// A semantic role within a predicate.
#[derive(Debug, Clone)]
pub struct RoleNode {
    /// Role label, e.g. `A0`, `A1`, `AM-TMP`.
    pub sem_role: String,
    /// Term-identifier span of the argument.
    pub span: Vec<String>,
}

/// An SRL predicate node.
#[derive(Debug, Clone)]
pub struct PredicateNode {
    /// Predicate identifier, e.g. `pr3`.
    pub id: String,
    /// Discourse position: 0-based index in document order.
    pub order: usize,
    /// Surface gloss from the comment preceding the predicate, if present.
    pub gloss: Option<String>,
    /// Evoking-phrase term identifiers (the predicate's own span).
    pub span: Vec<String>,
    /// Roles in declaration order.
    pub roles: Vec<RoleNode>,
    /// External references (frame memberships and the like).
    pub external_refs: Vec<ExternalRef>,
    /// Every descendant term identifier, document order: evoking span
    /// followed by role spans. Used for containment joins.
    pub all_targets: Vec<String>,
}

impl PredicateNode {
    /// FrameNet references, in declaration order.
    pub fn frame_refs(&self) -> impl Iterator<Item = &str> {
        self.external_refs
            .iter()
            .filter(|r| r.resource == "FrameNet")
            .map(|r| r.reference.as_str())
    }
}

/// An opinion node: expression span with polarity, target span, holder span.
#[derive(Debug, Clone, Default)]
pub struct OpinionNode {
    /// Opinion identifier, e.g. `o1`.
    pub id: String,
    /// Expression term span.
    pub expression: Vec<String>,
    /// Polarity attribute of the expression (e.g. `positive`, `negative`).
    pub polarity: String,
    /// Target term span; an opinion without one is unusable downstream.
    pub target: Vec<String>,
    /// Holder term span, often absent.
    pub holder: Vec<String>,
}

impl OpinionNode {
    /// Term identifiers participating in containment joins: target followed
    /// by expression. The holder does not participate.
    pub fn link_span(&self) -> Vec<String> {
        let mut ids = self.target.clone();
        ids.extend(self.expression.iter().cloned());
        ids
    }
}

/// An entity mention.
#[derive(Debug, Clone, Default)]
pub struct EntityNode {
    /// Entity identifier, e.g. `e2`.
    pub id: String,
    /// Type label, e.g. `PER`, `ORG`, `LOC`.
    pub entity_type: String,
    /// Surface value, recovered from the references comment.
    pub value: String,
    /// Term-identifier span of the mention.
    pub span: Vec<String>,
}

/// The parsed hierarchical layer for one document.
#[derive(Debug, Clone, Default)]
pub struct NafDocument {
    /// The document's raw text.
    pub raw: String,
    /// Word forms in document order.
    pub tokens: Vec<WordForm>,
    /// Terms in document order.
    pub terms: Vec<TermNode>,
    /// SRL predicates in document order.
    pub predicates: Vec<PredicateNode>,
    /// Opinions in document order.
    pub opinions: Vec<OpinionNode>,
    /// Entity mentions in document order.
    pub entities: Vec<EntityNode>,
}

impl NafDocument {
    /// Parse a NAF/KAF file.
    pub fn from_path(path: &Path) -> AnnotationResult<Self> {
        let file = File::open(path).map_err(|e| AnnotationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_xml(BufReader::new(file))
    }

    /// Parse a NAF/KAF document from any buffered byte stream.
    pub fn from_xml<R: std::io::BufRead>(reader: R) -> AnnotationResult<Self> {
        let mut xml = Reader::from_reader(reader);
        xml.config_mut().trim_text(true);

        let mut doc = NafDocument::default();
        let mut parser = NafParser::default();
        let mut buf = Vec::new();

        loop {
            let event = xml.read_event_into(&mut buf).map_err(|e| AnnotationError::Xml {
                message: format!("at byte {}: {e}", xml.buffer_position()),
            })?;
            match event {
                Event::Start(e) => parser.open(&e, &mut doc)?,
                Event::Empty(e) => {
                    parser.open(&e, &mut doc)?;
                    parser.close(e.local_name().as_ref(), &mut doc);
                }
                Event::End(e) => parser.close(e.local_name().as_ref(), &mut doc),
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| AnnotationError::Xml {
                        message: format!("text decode: {e}"),
                    })?;
                    parser.text(&text, &mut doc);
                }
                Event::Comment(c) => {
                    let text = String::from_utf8_lossy(c.as_ref()).trim().to_string();
                    parser.comment(text);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if doc.tokens.is_empty() {
            return Err(AnnotationError::EmptyTokenLayer);
        }
        Ok(doc)
    }
}

/// Which opinion sub-element a span belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum OpinionPart {
    #[default]
    None,
    Holder,
    Target,
    Expression,
}

/// Mutable cursor state for the single-pass event walk.
#[derive(Default)]
struct NafParser {
    in_raw: bool,
    in_srl: bool,
    in_entity_refs: bool,
    current_wf: Option<WordForm>,
    current_term: Option<TermNode>,
    current_pred: Option<PredicateNode>,
    current_role: Option<RoleNode>,
    in_pred_span: bool,
    current_opinion: Option<OpinionNode>,
    opinion_part: OpinionPart,
    current_entity: Option<EntityNode>,
    pending_comment: Option<String>,
    predicate_count: usize,
}

impl NafParser {
    fn open(&mut self, e: &BytesStart<'_>, _doc: &mut NafDocument) -> AnnotationResult<()> {
        match e.local_name().as_ref() {
            b"raw" => self.in_raw = true,
            b"srl" => self.in_srl = true,
            b"wf" => {
                self.current_wf = Some(WordForm {
                    id: attr(e, "id")?.unwrap_or_default(),
                    sent: attr(e, "sent")?
                        .and_then(|s| s.trim().parse().ok())
                        .unwrap_or(0),
                    text: String::new(),
                });
            }
            b"term" => {
                self.current_term = Some(TermNode {
                    id: attr(e, "id")?.unwrap_or_default(),
                    span: Vec::new(),
                });
            }
            b"predicate" => {
                self.current_pred = Some(PredicateNode {
                    id: attr(e, "id")?.unwrap_or_default(),
                    order: self.predicate_count,
                    gloss: self.pending_comment.take(),
                    span: Vec::new(),
                    roles: Vec::new(),
                    external_refs: Vec::new(),
                    all_targets: Vec::new(),
                });
                self.predicate_count += 1;
            }
            b"role" => {
                if self.current_pred.is_some() {
                    self.current_role = Some(RoleNode {
                        sem_role: attr(e, "semRole")?.unwrap_or_default(),
                        span: Vec::new(),
                    });
                }
            }
            b"externalRef" => {
                if let Some(pred) = self.current_pred.as_mut() {
                    pred.external_refs.push(ExternalRef {
                        resource: attr(e, "resource")?.unwrap_or_default(),
                        reference: attr(e, "reference")?.unwrap_or_default(),
                    });
                }
            }
            b"span" => {
                if self.current_pred.is_some() && self.current_role.is_none() {
                    self.in_pred_span = true;
                }
            }
            b"opinion" => {
                self.current_opinion = Some(OpinionNode {
                    id: attr(e, "id")?.unwrap_or_default(),
                    ..Default::default()
                });
            }
            b"opinion_holder" => self.opinion_part = OpinionPart::Holder,
            b"opinion_target" => self.opinion_part = OpinionPart::Target,
            b"opinion_expression" => {
                self.opinion_part = OpinionPart::Expression;
                if let Some(op) = self.current_opinion.as_mut() {
                    op.polarity = attr(e, "polarity")?.unwrap_or_default();
                }
            }
            b"entity" => {
                self.current_entity = Some(EntityNode {
                    id: attr(e, "id")?.unwrap_or_default(),
                    entity_type: attr(e, "type")?.unwrap_or_default(),
                    ..Default::default()
                });
            }
            b"references" => {
                if self.current_entity.is_some() {
                    self.in_entity_refs = true;
                }
            }
            b"target" => {
                if let Some(id) = attr(e, "id")? {
                    self.route_target(id);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Route a `<target id=...>` to whichever structure is being built.
    fn route_target(&mut self, id: String) {
        if let Some(role) = self.current_role.as_mut() {
            role.span.push(id.clone());
            if let Some(pred) = self.current_pred.as_mut() {
                pred.all_targets.push(id);
            }
        } else if let Some(pred) = self.current_pred.as_mut() {
            if self.in_pred_span {
                pred.span.push(id.clone());
            }
            pred.all_targets.push(id);
        } else if let Some(op) = self.current_opinion.as_mut() {
            match self.opinion_part {
                OpinionPart::Holder => op.holder.push(id),
                OpinionPart::Target => op.target.push(id),
                OpinionPart::Expression => op.expression.push(id),
                OpinionPart::None => {}
            }
        } else if let Some(entity) = self.current_entity.as_mut() {
            if self.in_entity_refs {
                entity.span.push(id);
            }
        } else if let Some(term) = self.current_term.as_mut() {
            term.span.push(id);
        }
    }

    fn close(&mut self, name: &[u8], doc: &mut NafDocument) {
        match name {
            b"raw" => self.in_raw = false,
            b"srl" => {
                self.in_srl = false;
                self.pending_comment = None;
            }
            b"wf" => {
                if let Some(wf) = self.current_wf.take() {
                    doc.tokens.push(wf);
                }
            }
            b"term" => {
                if let Some(term) = self.current_term.take() {
                    doc.terms.push(term);
                }
            }
            b"predicate" => {
                if let Some(pred) = self.current_pred.take() {
                    doc.predicates.push(pred);
                }
                self.in_pred_span = false;
            }
            b"role" => {
                if let Some(role) = self.current_role.take() {
                    if let Some(pred) = self.current_pred.as_mut() {
                        pred.roles.push(role);
                    }
                }
            }
            b"span" => self.in_pred_span = false,
            b"opinion" => {
                if let Some(op) = self.current_opinion.take() {
                    doc.opinions.push(op);
                }
                self.opinion_part = OpinionPart::None;
            }
            b"opinion_holder" | b"opinion_target" | b"opinion_expression" => {
                self.opinion_part = OpinionPart::None;
            }
            b"entity" => {
                if let Some(entity) = self.current_entity.take() {
                    doc.entities.push(entity);
                }
            }
            b"references" => self.in_entity_refs = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str, doc: &mut NafDocument) {
        if let Some(wf) = self.current_wf.as_mut() {
            wf.text.push_str(text);
        } else if self.in_raw {
            doc.raw.push_str(text);
        }
    }

    fn comment(&mut self, text: String) {
        if self.in_entity_refs {
            if let Some(entity) = self.current_entity.as_mut() {
                if entity.value.is_empty() {
                    entity.value = text;
                }
                return;
            }
        }
        // Inside <srl> but outside any predicate: the toolchain's gloss
        // comment for the predicate that follows.
        if self.in_srl && self.current_pred.is_none() {
            self.pending_comment = Some(text);
        }
    }
}

/// Read an unescaped attribute value by local name.
fn attr(e: &BytesStart<'_>, name: &str) -> AnnotationResult<Option<String>> {
    for a in e.attributes() {
        let a = a.map_err(|err| AnnotationError::Xml {
            message: format!("attribute decode: {err}"),
        })?;
        if a.key.local_name().as_ref() == name.as_bytes() {
            let value = a.unescape_value().map_err(|err| AnnotationError::Xml {
                message: format!("attribute value decode: {err}"),
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<NAF xml:lang="en" version="v3">
  <raw>The mayor rejected the plan.</raw>
  <text>
    <wf id="w1" sent="1" offset="0" length="3">The</wf>
    <wf id="w2" sent="1" offset="4" length="5">mayor</wf>
    <wf id="w3" sent="1" offset="10" length="8">rejected</wf>
    <wf id="w4" sent="1" offset="19" length="3">the</wf>
    <wf id="w5" sent="1" offset="23" length="4">plan</wf>
  </text>
  <terms>
    <term id="t1"><span><target id="w1"/></span></term>
    <term id="t2"><span><target id="w2"/></span></term>
    <term id="t3"><span><target id="w3"/></span></term>
    <term id="t4"><span><target id="w4"/></span></term>
    <term id="t5"><span><target id="w5"/></span></term>
  </terms>
  <srl>
    <!--rejected-->
    <predicate id="pr1">
      <externalReferences>
        <externalRef resource="FrameNet" reference="Statement"/>
        <externalRef resource="FrameNet" reference="Judgment"/>
        <externalRef resource="PropBank" reference="reject.01"/>
      </externalReferences>
      <span><target id="t3"/></span>
      <role id="r1" semRole="A0"><span><target id="t1"/><target id="t2"/></span></role>
      <role id="r2" semRole="A1"><span><target id="t4"/><target id="t5"/></span></role>
    </predicate>
  </srl>
  <opinions>
    <opinion id="o1">
      <opinion_holder><span><target id="t2"/></span></opinion_holder>
      <opinion_target><span><target id="t5"/></span></opinion_target>
      <opinion_expression polarity="negative"><span><target id="t3"/></span></opinion_expression>
    </opinion>
  </opinions>
  <entities>
    <entity id="e1" type="PER">
      <references><!--The mayor--><span><target id="t1"/><target id="t2"/></span></references>
    </entity>
  </entities>
</NAF>
"#;

    fn parse() -> NafDocument {
        NafDocument::from_xml(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn token_layer() {
        let doc = parse();
        assert_eq!(doc.raw, "The mayor rejected the plan.");
        assert_eq!(doc.tokens.len(), 5);
        assert_eq!(doc.tokens[1].id, "w2");
        assert_eq!(doc.tokens[1].sent, 1);
        assert_eq!(doc.tokens[1].text, "mayor");
        assert_eq!(doc.terms.len(), 5);
        assert_eq!(doc.terms[2].span, vec!["w3"]);
    }

    #[test]
    fn predicate_spans_and_roles() {
        let doc = parse();
        assert_eq!(doc.predicates.len(), 1);
        let pred = &doc.predicates[0];
        assert_eq!(pred.id, "pr1");
        assert_eq!(pred.order, 0);
        assert_eq!(pred.gloss.as_deref(), Some("rejected"));
        assert_eq!(pred.span, vec!["t3"]);
        assert_eq!(pred.roles.len(), 2);
        assert_eq!(pred.roles[0].sem_role, "A0");
        assert_eq!(pred.roles[0].span, vec!["t1", "t2"]);
        assert_eq!(pred.roles[1].sem_role, "A1");
        // Descendant set covers the evoking span plus every role span.
        assert_eq!(pred.all_targets, vec!["t3", "t1", "t2", "t4", "t5"]);
    }

    #[test]
    fn frame_refs_filter_by_resource() {
        let doc = parse();
        let refs: Vec<&str> = doc.predicates[0].frame_refs().collect();
        assert_eq!(refs, vec!["Statement", "Judgment"]);
    }

    #[test]
    fn opinion_parts() {
        let doc = parse();
        let op = &doc.opinions[0];
        assert_eq!(op.holder, vec!["t2"]);
        assert_eq!(op.target, vec!["t5"]);
        assert_eq!(op.expression, vec!["t3"]);
        assert_eq!(op.polarity, "negative");
        // Containment span excludes the holder.
        assert_eq!(op.link_span(), vec!["t5", "t3"]);
    }

    #[test]
    fn entity_value_from_comment() {
        let doc = parse();
        let entity = &doc.entities[0];
        assert_eq!(entity.entity_type, "PER");
        assert_eq!(entity.value, "The mayor");
        assert_eq!(entity.span, vec!["t1", "t2"]);
    }

    #[test]
    fn empty_token_layer_rejected() {
        let xml = r#"<NAF><raw>text</raw><text></text></NAF>"#;
        let err = NafDocument::from_xml(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, AnnotationError::EmptyTokenLayer));
    }
}
