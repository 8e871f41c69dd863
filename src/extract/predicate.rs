//! Frame-gated predicate extraction from the hierarchical layer.

use std::collections::BTreeSet;

use crate::align::TermIndex;
use crate::annotation::naf::NafDocument;
use crate::record::{Predicate, Role};

/// Extract the predicates whose FrameNet references intersect the eligible
/// frame set.
///
/// The eligibility test is an intersection over *all* of a predicate's
/// FrameNet references; the recorded frame label is the *first* reference.
/// Predicates referencing terms the token stream doesn't know are skipped
/// with a diagnostic (a structural mismatch between the layers, recoverable
/// per record).
pub fn predicates(
    doc: &NafDocument,
    index: &TermIndex,
    eligible: &BTreeSet<String>,
) -> Vec<Predicate> {
    let mut out = Vec::new();
    let mut rejected = 0usize;

    for node in &doc.predicates {
        let refs: Vec<&str> = node.frame_refs().collect();
        if !refs.iter().any(|r| eligible.contains(*r)) {
            rejected += 1;
            continue;
        }
        let Some(frame) = refs.first() else {
            rejected += 1;
            continue;
        };

        let build = || -> crate::error::AlignResult<Predicate> {
            let text = index.phrase(&node.span)?;
            let roles = node
                .roles
                .iter()
                .map(|r| {
                    Ok(Role {
                        label: r.sem_role.clone(),
                        span: r.span.clone(),
                        text: index.joined_text(&r.span)?,
                    })
                })
                .collect::<crate::error::AlignResult<Vec<Role>>>()?;
            let sent_id = match node.span.first().or(node.all_targets.first()) {
                Some(term) => index.sentence(term)?,
                None => 0,
            };
            Ok(Predicate {
                frame: frame.to_string(),
                span: node.span.clone(),
                text,
                roles,
                all_terms: node.all_targets.clone(),
                order: node.order,
                gloss: node.gloss.clone(),
                sent_id,
            })
        };

        match build() {
            Ok(pred) => out.push(pred),
            Err(e) => {
                tracing::warn!(predicate = %node.id, error = %e, "skipping predicate with unresolvable span");
            }
        }
    }

    if rejected > 0 {
        tracing::debug!(rejected, kept = out.len(), "frame filter applied");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::naf::{ExternalRef, PredicateNode, RoleNode, WordForm};

    fn doc() -> NafDocument {
        NafDocument {
            tokens: vec![
                WordForm { id: "w1".into(), sent: 1, text: "The".into() },
                WordForm { id: "w2".into(), sent: 1, text: "mayor".into() },
                WordForm { id: "w3".into(), sent: 1, text: "rejected".into() },
                WordForm { id: "w4".into(), sent: 1, text: "the".into() },
                WordForm { id: "w5".into(), sent: 1, text: "plan".into() },
            ],
            predicates: vec![
                predicate_node("pr1", 0, &["Statement"], &["t3"]),
                predicate_node("pr2", 1, &["Motion"], &["t5"]),
            ],
            ..Default::default()
        }
    }

    fn predicate_node(id: &str, order: usize, frames: &[&str], span: &[&str]) -> PredicateNode {
        PredicateNode {
            id: id.into(),
            order,
            gloss: None,
            span: span.iter().map(|s| s.to_string()).collect(),
            roles: vec![
                RoleNode { sem_role: "A0".into(), span: vec!["t1".into(), "t2".into()] },
                RoleNode { sem_role: "A1".into(), span: vec!["t4".into(), "t5".into()] },
            ],
            external_refs: frames
                .iter()
                .map(|f| ExternalRef { resource: "FrameNet".into(), reference: f.to_string() })
                .collect(),
            all_targets: {
                let mut all: Vec<String> = span.iter().map(|s| s.to_string()).collect();
                all.extend(["t1", "t2", "t4", "t5"].map(String::from));
                all
            },
        }
    }

    fn eligible(frames: &[&str]) -> BTreeSet<String> {
        frames.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn frame_filter_gates_predicates() {
        let d = doc();
        let index = TermIndex::build(&d);
        let preds = predicates(&d, &index, &eligible(&["Statement"]));
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].frame, "Statement");
        assert_eq!(preds[0].text, "rejected");
    }

    #[test]
    fn ineligible_frames_never_pass() {
        let d = doc();
        let index = TermIndex::build(&d);
        let preds = predicates(&d, &index, &eligible(&["Commerce_buy"]));
        assert!(preds.is_empty());
    }

    #[test]
    fn roles_preserve_declaration_order() {
        let d = doc();
        let index = TermIndex::build(&d);
        let preds = predicates(&d, &index, &eligible(&["Statement"]));
        let labels: Vec<&str> = preds[0].roles.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["A0", "A1"]);
        assert_eq!(preds[0].roles[0].text, "The mayor");
        assert_eq!(preds[0].roles[1].text, "the plan");
    }

    #[test]
    fn unresolvable_span_skips_record_only() {
        let mut d = doc();
        d.predicates.push(predicate_node("pr3", 2, &["Statement"], &["t99"]));
        let index = TermIndex::build(&d);
        let preds = predicates(&d, &index, &eligible(&["Statement"]));
        // pr1 survives, pr3 is skipped for its unknown term.
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].order, 0);
    }

    #[test]
    fn first_frame_ref_labels_even_when_second_matches() {
        let mut d = doc();
        d.predicates[1].external_refs = vec![
            ExternalRef { resource: "FrameNet".into(), reference: "Motion".into() },
            ExternalRef { resource: "FrameNet".into(), reference: "Statement".into() },
        ];
        let index = TermIndex::build(&d);
        let preds = predicates(&d, &index, &eligible(&["Statement"]));
        assert_eq!(preds.len(), 2);
        // pr2 is admitted by "Statement" but labeled with its first ref.
        assert_eq!(preds[1].frame, "Motion");
    }
}
