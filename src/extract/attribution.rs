//! Attribution extraction from the flat tagging stream.
//!
//! The tagging scheme packs a whole attribution's field labels into the tag
//! that opens its content span. A `B-content-5:5-source#5-cue` cell says:
//! content group 5, with source group 5 and cue group 5 tagged elsewhere in
//! their own columns. Decoding splits on the delimiters `:`, `_`, `#`;
//! digit-led parts are `<group>-<field>` pairs that rotate (lowercased) into
//! the `<field>-<group>` form actually present in the tag columns, and the
//! leading part minus its `B-` prefix is the content needle itself. Numbered
//! groups are what keep multiple attributions within one sentence apart.

use std::sync::LazyLock;

use regex::Regex;

use crate::annotation::conll::{AttrField, TokenTable};
use crate::annotation::{PLACEHOLDER, is_placeholder};
use crate::detok;
use crate::record::Attribution;

static DELIMITERS: LazyLock<Regex> = LazyLock::new(|| Regex::new("[:_#]").unwrap());

/// A decoded tag label: which column to scan, and the group needle to match.
#[derive(Debug, Clone, PartialEq)]
struct FieldNeedle {
    field: AttrField,
    needle: String,
}

/// Decode one `B-content...` tag into its field needles.
fn decode_tag(tag: &str) -> Vec<FieldNeedle> {
    let parts: Vec<&str> = DELIMITERS.split(tag).collect();
    let mut needles = Vec::new();

    for part in &parts {
        if !part.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            continue;
        }
        if let Some((group, field)) = part.split_once('-') {
            let rotated = format!("{field}-{group}").to_lowercase();
            if rotated.contains("cue") {
                needles.push(FieldNeedle { field: AttrField::Cue, needle: rotated });
            } else if rotated.contains("source") {
                needles.push(FieldNeedle { field: AttrField::Source, needle: rotated });
            }
        }
    }

    if let Some(first) = parts.first() {
        let content = first.strip_prefix("B-").unwrap_or(first);
        needles.push(FieldNeedle {
            field: AttrField::Content,
            needle: content.to_string(),
        });
    }

    needles
}

/// Extract attributions: one record per `B-content` tag, fields regrouped
/// from the rows sharing each field+group needle.
///
/// A needle that matches no rows leaves its field as the placeholder; a
/// content needle with no rows drops the whole record with a diagnostic
/// (reported, not fatal).
pub fn attributions(table: &TokenTable) -> Vec<Attribution> {
    let mut out = Vec::new();

    for tag in table.content_begin_tags() {
        let mut source = PLACEHOLDER.to_string();
        let mut cue = PLACEHOLDER.to_string();
        let mut content = PLACEHOLDER.to_string();
        let mut sent_id = None;

        for FieldNeedle { field, needle } in decode_tag(tag) {
            // First sentence group among the matching rows governs the field.
            let rows: Vec<_> = table.rows_tagged(field, &needle).collect();
            let Some(first) = rows.first() else {
                if field == AttrField::Content {
                    tracing::warn!(tag, needle = %needle, "attribution content group matched no rows; dropping record");
                }
                continue;
            };
            let group_sent = first.sent_id;
            let words = rows
                .iter()
                .take_while(|r| r.sent_id == group_sent)
                .map(|r| r.word.as_str());
            let text = detok::detokenize(words);
            match field {
                AttrField::Source => source = text,
                AttrField::Cue => cue = text,
                AttrField::Content => {
                    content = text;
                    sent_id = Some(group_sent);
                }
            }
        }

        let Some(sent_id) = sent_id else {
            continue;
        };
        if is_placeholder(&content) {
            continue;
        }
        out.push(Attribution { source, cue, content, sent_id });
    }

    if out.is_empty() {
        tracing::debug!("no attributions extracted from token table");
    }
    out
}
