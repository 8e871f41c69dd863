//! Fuzzy assembly: one perspective per claim whose attribution join succeeds.
//!
//! The claim↔attribution similarity join is mandatory; a claim without a
//! match is a discarded candidate, not an error. Every other pairing is
//! best-effort and populates an optional field when its own join clears its
//! threshold:
//!
//! - attribution ↔ predicate: role set, frame, and discourse order
//! - attribution ↔ entity: resolved source entity (case-insensitive type)
//! - predicate ↔ opinion: opinion attachment on the matched predicate
//! - claim ↔ opinion: argument sentiment, reusing the opinion's own stored
//!   polarity rather than recomputing
//!
//! All cross-referencing between these independently computed match lists
//! joins on record indices, never on text values, so two records sharing an
//! identical text value cannot cross wires.

use crate::annotation::is_placeholder;
use crate::assemble::{AssemblyStats, DiscardReason};
use crate::config::LinkConfig;
use crate::link::fuzzy::{FuzzyMatch, best_match, link_all};
use crate::record::{
    Attribution, Claim, Opinion, OpinionAttachment, Perspective, Predicate, ResolvedEntity,
};
use crate::sentiment;
use crate::store::EntityTable;

/// Assemble perspectives from claims and attributions, with best-effort
/// secondary joins.
pub fn assemble(
    claims: &[Claim],
    attributions: &[Attribution],
    predicates: &[Predicate],
    opinions: &[Opinion],
    entity_types: &EntityTable,
    config: &LinkConfig,
) -> (Vec<Perspective>, AssemblyStats) {
    let mut out = Vec::new();
    let mut stats = AssemblyStats::default();

    // The mandatory pairing, computed once for all claims.
    let mandatory: Vec<FuzzyMatch> = link_all(
        claims,
        attributions,
        |c| &c.value,
        |a| &a.content,
        config.claim_attribution,
    );

    let entity_values: Vec<(&str, &str)> = entity_types.iter().collect();

    for (claim_idx, claim) in claims.iter().enumerate() {
        let Some(m) = mandatory.iter().find(|m| m.left == claim_idx) else {
            stats.record_discard(DiscardReason::MandatoryJoinFailed);
            continue;
        };
        let attribution = &attributions[m.right];
        if is_placeholder(&attribution.source) || is_placeholder(&attribution.cue) {
            stats.record_discard(DiscardReason::MissingSourceOrCue);
            continue;
        }

        // attribution ↔ predicate: the cue against the evoking phrase.
        let matched_predicate = best_match(
            &attribution.cue,
            predicates.iter().enumerate().map(|(i, p)| (i, p.text.as_str())),
            config.attribution_predicate,
        )
        .map(|(i, _)| &predicates[i]);

        // attribution ↔ entity: the source against known entity values.
        let source_entity = best_match(
            &attribution.source,
            entity_values.iter().enumerate().map(|(i, (v, _))| (i, *v)),
            config.attribution_entity,
        )
        .map(|(i, _)| {
            let (value, _) = entity_values[i];
            ResolvedEntity {
                value: value.to_string(),
                entity_type: entity_types.get(value).map(|(_, t)| t.to_string()),
            }
        });

        // predicate ↔ opinion: attach the best-matching expression to the
        // matched predicate only.
        let mut attachments: Vec<OpinionAttachment> = Vec::new();
        if let Some(predicate) = matched_predicate {
            if let Some((i, _)) = best_match(
                &predicate.text,
                opinions.iter().enumerate().map(|(i, o)| (i, o.expression.as_str())),
                config.predicate_opinion,
            ) {
                attachments.push(attachment(&opinions[i]));
            }
        }

        // claim ↔ opinion: argument sentiment from the opinion's stored
        // polarity (no reclassification).
        let argument_match = best_match(
            &claim.value,
            opinions.iter().enumerate().map(|(i, o)| (i, o.target.as_str())),
            config.claim_opinion,
        );
        let argument_sentiment = argument_match
            .and_then(|(i, _)| sentiment::PolarityLabel::parse(&opinions[i].polarity));
        if let Some((i, _)) = argument_match {
            if !attachments.iter().any(|a| a.expression_span == opinions[i].expression_span) {
                attachments.push(attachment(&opinions[i]));
            }
        }

        stats.record_join();
        out.push(Perspective {
            source: attribution.source.clone(),
            cue: attribution.cue.clone(),
            statement: claim.value.clone(),
            // Token-level provenance lives on the claim record itself.
            statement_span: Vec::new(),
            frame: matched_predicate.map(|p| p.frame.clone()),
            roles: matched_predicate.and_then(|p| {
                if p.roles.is_empty() {
                    None
                } else {
                    Some(p.roles.clone())
                }
            }),
            opinions: attachments,
            sentiment: Some(argument_sentiment.unwrap_or_else(|| sentiment::classify(&claim.value))),
            cue_sentiment: Some(sentiment::classify(&attribution.cue)),
            source_entity,
            target_entity: None,
            order: matched_predicate.map(|p| p.order),
            sent_id: claim.sent_id,
        });
    }

    (out, stats)
}

fn attachment(opinion: &Opinion) -> OpinionAttachment {
    OpinionAttachment {
        expression: opinion.expression.clone(),
        target: opinion.target.clone(),
        polarity: opinion.polarity.clone(),
        expression_span: opinion.expression_span.clone(),
        target_span: opinion.target_span.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(value: &str) -> Claim {
        Claim {
            value: value.into(),
            sent_id: 1,
            token_ids: vec!["w1".into(), "w2".into()],
        }
    }

    fn attribution(source: &str, cue: &str, content: &str) -> Attribution {
        Attribution {
            source: source.into(),
            cue: cue.into(),
            content: content.into(),
            sent_id: 1,
        }
    }

    #[test]
    fn mandatory_join_emits_perspective() {
        let claims = [claim("The mayor rejected the plan")];
        let attrs = [attribution("the mayor", "rejected", "rejected the plan")];
        // Content and claim differ but stay above a permissive threshold.
        let config = LinkConfig {
            claim_attribution: 50.0,
            ..Default::default()
        };
        let (persp, stats) = assemble(&claims, &attrs, &[], &[], &EntityTable::default(), &config);
        assert_eq!(persp.len(), 1);
        assert_eq!(stats.joined, 1);
        assert_eq!(persp[0].source, "the mayor");
        assert_eq!(persp[0].cue, "rejected");
        assert_eq!(persp[0].statement, "The mayor rejected the plan");
        assert!(persp[0].cue_sentiment.is_some());
    }

    #[test]
    fn failed_mandatory_join_discards_silently() {
        let claims = [claim("Completely unrelated words here")];
        let attrs = [attribution("the mayor", "rejected", "rejected the plan")];
        let (persp, stats) = assemble(
            &claims,
            &attrs,
            &[],
            &[],
            &EntityTable::default(),
            &LinkConfig::default(),
        );
        assert!(persp.is_empty());
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn placeholder_source_discards_candidate() {
        let claims = [claim("rejected the plan")];
        let attrs = [attribution("-", "rejected", "rejected the plan")];
        let config = LinkConfig {
            claim_attribution: 50.0,
            ..Default::default()
        };
        let (persp, stats) = assemble(&claims, &attrs, &[], &[], &EntityTable::default(), &config);
        assert!(persp.is_empty());
        assert_eq!(stats.discarded, 1);
    }

    #[test]
    fn entity_resolution_is_case_insensitive_and_best_effort() {
        let claims = [claim("The mayor rejected the plan")];
        let attrs = [attribution("mayor smith", "rejected", "The mayor rejected the plan")];
        let table = EntityTable::from_pairs(vec![("Mayor Smith".into(), "PER".into())]);
        let config = LinkConfig {
            claim_attribution: 50.0,
            attribution_entity: 80.0,
            ..Default::default()
        };
        let (persp, _) = assemble(&claims, &attrs, &[], &[], &table, &config);
        let resolved = persp[0].source_entity.as_ref().unwrap();
        assert_eq!(resolved.value, "Mayor Smith");
        assert_eq!(resolved.entity_type.as_deref(), Some("PER"));
    }

    #[test]
    fn secondary_fields_absent_on_lookup_failure() {
        let claims = [claim("The mayor rejected the plan")];
        let attrs = [attribution("the mayor", "rejected", "The mayor rejected the plan")];
        let (persp, _) = assemble(
            &claims,
            &attrs,
            &[],
            &[],
            &EntityTable::default(),
            &LinkConfig::default(),
        );
        let p = &persp[0];
        assert!(p.frame.is_none());
        assert!(p.roles.is_none());
        assert!(p.source_entity.is_none());
        assert!(p.opinions.is_empty());
        assert!(p.order.is_none());
        // Statement sentiment falls back to classification.
        assert!(p.sentiment.is_some());
    }

    #[test]
    fn argument_sentiment_reuses_stored_polarity() {
        let claims = [claim("the plan")];
        let attrs = [attribution("the mayor", "rejected", "the plan")];
        let opinions = [Opinion {
            expression: "rejected".into(),
            target: "the plan".into(),
            holder: None,
            polarity: "negative".into(),
            expression_span: vec!["t3".into()],
            target_span: vec!["t4".into(), "t5".into()],
            holder_span: vec![],
            sent_id: 1,
        }];
        let config = LinkConfig {
            claim_attribution: 50.0,
            claim_opinion: 50.0,
            ..Default::default()
        };
        let (persp, _) = assemble(
            &claims,
            &attrs,
            &[],
            &opinions,
            &EntityTable::default(),
            &config,
        );
        let p = &persp[0];
        // "the plan" classifies neutral, but the opinion's stored polarity wins.
        assert_eq!(p.sentiment, Some(sentiment::PolarityLabel::Negative));
        assert_eq!(p.opinions.len(), 1);
    }

    #[test]
    fn identical_claim_texts_join_independently() {
        // Two claims with the same text must each get their own record,
        // joined by index rather than by value lookup.
        let claims = [claim("the plan failed"), claim("the plan failed")];
        let attrs = [
            attribution("smith", "said", "the plan failed"),
            attribution("jones", "claimed", "the plan failed"),
        ];
        let config = LinkConfig {
            claim_attribution: 50.0,
            ..Default::default()
        };
        let (persp, _) = assemble(&claims, &attrs, &[], &[], &EntityTable::default(), &config);
        assert_eq!(persp.len(), 2);
        // Both claims match the first-encountered attribution on a tie.
        assert_eq!(persp[0].source, "smith");
        assert_eq!(persp[1].source, "smith");
    }
}
