//! Opinion and entity extraction from the hierarchical layer.

use crate::align::TermIndex;
use crate::annotation::naf::NafDocument;
use crate::record::{Entity, Opinion};

/// Extract opinions. An opinion without a resolvable target is dropped
/// before any linkage step; spans the token stream doesn't know drop the
/// record with a diagnostic.
pub fn opinions(doc: &NafDocument, index: &TermIndex) -> Vec<Opinion> {
    let mut out = Vec::new();

    for node in &doc.opinions {
        if node.target.is_empty() {
            tracing::debug!(opinion = %node.id, "dropping opinion without target");
            continue;
        }

        let build = || -> crate::error::AlignResult<Opinion> {
            let holder = if node.holder.is_empty() {
                None
            } else {
                Some(index.phrase(&node.holder)?)
            };
            let sent_id = match node.expression.first().or(node.target.first()) {
                Some(term) => index.sentence(term)?,
                None => 0,
            };
            Ok(Opinion {
                expression: index.phrase(&node.expression)?,
                target: index.phrase(&node.target)?,
                holder,
                polarity: node.polarity.clone(),
                expression_span: node.expression.clone(),
                target_span: node.target.clone(),
                holder_span: node.holder.clone(),
                sent_id,
            })
        };

        match build() {
            Ok(op) => out.push(op),
            Err(e) => {
                tracing::warn!(opinion = %node.id, error = %e, "skipping opinion with unresolvable span");
            }
        }
    }

    out
}

/// Extract entity mentions. The governing sentence comes from the first
/// term of the reference span.
pub fn entities(doc: &NafDocument, index: &TermIndex) -> Vec<Entity> {
    let mut out = Vec::new();

    for node in &doc.entities {
        let sent_id = match node.span.first().map(|t| index.sentence(t)) {
            Some(Ok(sent)) => sent,
            Some(Err(e)) => {
                tracing::warn!(entity = %node.id, error = %e, "skipping entity with unresolvable span");
                continue;
            }
            None => {
                tracing::debug!(entity = %node.id, "dropping entity without span");
                continue;
            }
        };
        out.push(Entity {
            value: node.value.clone(),
            entity_type: node.entity_type.clone(),
            sent_id,
            span: node.span.clone(),
        });
    }

    out
}
