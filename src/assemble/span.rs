//! Span-based assembly: one perspective per frame-eligible predicate.
//!
//! The predicates arriving here already passed the frame filter. For each:
//! exact-link its opinions by term containment, reconstruct the statement
//! from the full descendant span, classify its sentiment, and resolve
//! source/target entities by exact span equality between the Agent/Theme
//! role spans and known entity spans.

use crate::align::TermIndex;
use crate::assemble::{AssemblyStats, DiscardReason};
use crate::link::exact;
use crate::record::{Entity, Opinion, OpinionAttachment, Perspective, Predicate, ResolvedEntity};
use crate::sentiment;
use crate::store::EntityTable;

/// Role labels carrying the attributing source and the statement's theme.
const AGENT_ROLE: &str = "A0";
const THEME_ROLE: &str = "A1";

/// Assemble perspectives from frame-eligible predicates.
pub fn assemble(
    predicates: &[Predicate],
    opinions: &[Opinion],
    entities: &[Entity],
    index: &TermIndex,
    entity_types: &EntityTable,
) -> (Vec<Perspective>, AssemblyStats) {
    let mut out = Vec::new();
    let mut stats = AssemblyStats::default();

    for predicate in predicates {
        let linked = exact::linked_opinions(predicate, opinions);

        let statement = match index.phrase_sorted(&predicate.all_terms) {
            Ok(statement) => statement,
            Err(e) => {
                tracing::warn!(error = %e, frame = %predicate.frame, "skipping predicate");
                stats.record_discard(DiscardReason::UnresolvableSpan);
                continue;
            }
        };
        let statement_span = index.span_words(&predicate.all_terms).unwrap_or_default();

        let source = predicate
            .role(AGENT_ROLE)
            .map(|r| r.text.clone())
            .unwrap_or_default();

        let (source_entity, target_entity) = resolve_entities(predicate, entities, entity_types);

        let attachments: Vec<OpinionAttachment> = linked
            .iter()
            .map(|op| OpinionAttachment {
                expression: op.expression.clone(),
                target: op.target.clone(),
                polarity: op.polarity.clone(),
                expression_span: op.expression_span.clone(),
                target_span: op.target_span.clone(),
            })
            .collect();

        stats.record_join();
        out.push(Perspective {
            source,
            cue: predicate.text.clone(),
            sentiment: Some(sentiment::classify(&statement)),
            cue_sentiment: None,
            statement,
            statement_span,
            frame: Some(predicate.frame.clone()),
            roles: if predicate.roles.is_empty() {
                None
            } else {
                Some(predicate.roles.clone())
            },
            opinions: attachments,
            source_entity,
            target_entity,
            order: Some(predicate.order),
            sent_id: predicate.sent_id,
        });
    }

    (out, stats)
}

/// Resolve source/target entities by exact span equality: the Agent role
/// span must equal a known entity span (likewise Theme), and resolution only
/// applies when the predicate has a Theme at all. The resolved value is the
/// role's own text; its type comes from the case-insensitive value→type
/// table, absent when the table doesn't know the value.
fn resolve_entities(
    predicate: &Predicate,
    entities: &[Entity],
    entity_types: &EntityTable,
) -> (Option<ResolvedEntity>, Option<ResolvedEntity>) {
    let Some(theme) = predicate.role(THEME_ROLE) else {
        return (None, None);
    };

    let resolve = |span: &[String], text: &str| -> Option<ResolvedEntity> {
        entities.iter().any(|e| e.span.as_slice() == span).then(|| ResolvedEntity {
            value: text.to_string(),
            entity_type: entity_types.get(text).map(|(_, t)| t.to_string()),
        })
    };

    let source = predicate
        .role(AGENT_ROLE)
        .and_then(|agent| resolve(&agent.span, &agent.text));
    let target = resolve(&theme.span, &theme.text);
    (source, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::naf::{NafDocument, WordForm};
    use crate::record::Role;

    fn index() -> TermIndex {
        let words = ["The", "mayor", "rejected", "the", "plan"];
        let doc = NafDocument {
            tokens: words
                .iter()
                .enumerate()
                .map(|(i, w)| WordForm {
                    id: format!("w{}", i + 1),
                    sent: 1,
                    text: w.to_string(),
                })
                .collect(),
            ..Default::default()
        };
        TermIndex::build(&doc)
    }

    fn predicate() -> Predicate {
        Predicate {
            frame: "Statement".into(),
            span: vec!["t3".into()],
            text: "rejected".into(),
            roles: vec![
                Role {
                    label: "A0".into(),
                    span: vec!["t1".into(), "t2".into()],
                    text: "The mayor".into(),
                },
                Role {
                    label: "A1".into(),
                    span: vec!["t4".into(), "t5".into()],
                    text: "the plan".into(),
                },
            ],
            all_terms: vec!["t3".into(), "t1".into(), "t2".into(), "t4".into(), "t5".into()],
            order: 0,
            gloss: Some("rejected".into()),
            sent_id: 1,
        }
    }

    fn opinion() -> Opinion {
        Opinion {
            expression: "rejected".into(),
            target: "the plan".into(),
            holder: None,
            polarity: "negative".into(),
            expression_span: vec!["t3".into()],
            target_span: vec!["t4".into(), "t5".into()],
            holder_span: vec![],
            sent_id: 1,
        }
    }

    fn entity() -> Entity {
        Entity {
            value: "The Mayor".into(),
            entity_type: "PER".into(),
            sent_id: 1,
            span: vec!["t1".into(), "t2".into()],
        }
    }

    #[test]
    fn builds_one_perspective_per_predicate() {
        let table = EntityTable::from_pairs(vec![("The Mayor".into(), "PER".into())]);
        let (persp, stats) =
            assemble(&[predicate()], &[opinion()], &[entity()], &index(), &table);
        assert_eq!(persp.len(), 1);
        assert_eq!(stats.joined, 1);
        let p = &persp[0];
        assert_eq!(p.statement, "The mayor rejected the plan");
        assert_eq!(p.cue, "rejected");
        assert_eq!(p.source, "The mayor");
        assert_eq!(p.frame.as_deref(), Some("Statement"));
        assert_eq!(p.opinions.len(), 1);
        assert_eq!(p.opinions[0].polarity, "negative");
        assert!(p.sentiment.is_some());
        assert_eq!(p.order, Some(0));
    }

    #[test]
    fn statement_span_is_document_ordered() {
        let table = EntityTable::default();
        let (persp, _) = assemble(&[predicate()], &[], &[], &index(), &table);
        let ids: Vec<&str> = persp[0].statement_span.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4", "t5"]);
    }

    #[test]
    fn entity_resolution_requires_exact_span_equality() {
        let table = EntityTable::from_pairs(vec![("The Mayor".into(), "PER".into())]);
        let (persp, _) =
            assemble(&[predicate()], &[], &[entity()], &index(), &table);
        let p = &persp[0];
        // A0 span equals the entity span → resolved, with its table type.
        let source = p.source_entity.as_ref().unwrap();
        assert_eq!(source.value, "The mayor");
        assert_eq!(source.entity_type.as_deref(), Some("PER"));
        // A1 span matches no entity span → absent.
        assert!(p.target_entity.is_none());
    }

    #[test]
    fn near_miss_span_does_not_resolve() {
        let mut near = entity();
        near.span = vec!["t1".into()]; // shorter than the A0 span
        let table = EntityTable::default();
        let (persp, _) = assemble(&[predicate()], &[], &[near], &index(), &table);
        assert!(persp[0].source_entity.is_none());
    }

    #[test]
    fn no_theme_role_skips_entity_resolution() {
        let mut pred = predicate();
        pred.roles.retain(|r| r.label == "A0");
        let table = EntityTable::default();
        let (persp, _) = assemble(&[pred], &[], &[entity()], &index(), &table);
        assert!(persp[0].source_entity.is_none());
        assert!(persp[0].target_entity.is_none());
    }

    #[test]
    fn partial_opinion_overlap_is_not_attached() {
        let mut op = opinion();
        op.target_span = vec!["t4".into(), "t9".into()];
        let table = EntityTable::default();
        let (persp, _) = assemble(&[predicate()], &[op], &[], &index(), &table);
        assert!(persp[0].opinions.is_empty());
    }

    #[test]
    fn unresolvable_statement_discards_candidate() {
        let mut pred = predicate();
        pred.all_terms.push("t99".into());
        let table = EntityTable::default();
        let (persp, stats) = assemble(&[pred], &[], &[], &index(), &table);
        assert!(persp.is_empty());
        assert_eq!(stats.discarded, 1);
    }
}
