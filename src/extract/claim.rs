//! Claim extraction from the flat tagging stream.

use std::collections::BTreeMap;

use crate::annotation::conll::TokenTable;
use crate::detok;
use crate::record::Claim;

/// Extract claims: every row whose tag marks claim membership, grouped by
/// sentence, detokenized per group.
pub fn claims(table: &TokenTable) -> Vec<Claim> {
    let mut groups: BTreeMap<u32, (Vec<&str>, Vec<String>)> = BTreeMap::new();
    for row in table.claim_rows() {
        let group = groups.entry(row.sent_id).or_default();
        group.0.push(row.word.as_str());
        group.1.push(row.token_id.clone());
    }

    groups
        .into_iter()
        .map(|(sent_id, (words, token_ids))| Claim {
            value: detok::detokenize(words),
            sent_id,
            token_ids,
        })
        .collect()
}
