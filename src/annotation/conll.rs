//! Reader for the flat tagging stream (tab-delimited token table).
//!
//! One row per token, with a header row naming at least `sent_id`,
//! `token_id`, `word`, `claim`, and `attr_content`; the `attr_source` and
//! `attr_cue` columns are present in fully tagged exports but tolerated as
//! absent. Missing cells read as the `-` placeholder. Malformed rows are
//! skipped with a diagnostic rather than failing the document.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::annotation::PLACEHOLDER;
use crate::error::{AnnotationError, AnnotationResult};

/// One token row of the flat tagging stream.
#[derive(Debug, Clone)]
pub struct TokenRow {
    /// 1-based sentence index.
    pub sent_id: u32,
    /// Token identifier within the document (word-space, e.g. `w12`, or a
    /// per-sentence ordinal — opaque to the reader).
    pub token_id: String,
    /// Surface word.
    pub word: String,
    /// Claim membership tag (`B-claim`, `I-claim`, or placeholder).
    pub claim: String,
    /// Attribution source tag group (`B-source-3`, ...).
    pub attr_source: String,
    /// Attribution cue tag group.
    pub attr_cue: String,
    /// Attribution content tag group; `B-content...` rows also carry the
    /// encoded field labels for the whole attribution.
    pub attr_content: String,
}

/// The attribution field a tag column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrField {
    Source,
    Cue,
    Content,
}

impl AttrField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Cue => "cue",
            Self::Content => "content",
        }
    }
}

impl TokenRow {
    /// The tag cell for the given attribution field.
    pub fn attr(&self, field: AttrField) -> &str {
        match field {
            AttrField::Source => &self.attr_source,
            AttrField::Cue => &self.attr_cue,
            AttrField::Content => &self.attr_content,
        }
    }
}

/// The parsed token table for one document.
#[derive(Debug, Clone)]
pub struct TokenTable {
    rows: Vec<TokenRow>,
}

impl TokenTable {
    /// Read a token table from a file path.
    pub fn from_path(path: &Path) -> AnnotationResult<Self> {
        let file = File::open(path).map_err(|e| AnnotationError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(file)
    }

    /// Read a token table from any byte stream.
    pub fn from_reader<R: Read>(reader: R) -> AnnotationResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| AnnotationError::Table {
                message: format!("header row: {e}"),
            })?
            .clone();

        let col = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            col(name).ok_or_else(|| AnnotationError::MissingColumn {
                column: name.to_string(),
            })
        };

        let sent_col = require("sent_id")?;
        let token_col = require("token_id")?;
        let word_col = require("word")?;
        let claim_col = require("claim")?;
        let content_col = require("attr_content")?;
        let source_col = col("attr_source");
        let cue_col = col("attr_cue");

        let cell = |rec: &csv::StringRecord, idx: usize| -> String {
            match rec.get(idx) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => PLACEHOLDER.to_string(),
            }
        };

        let mut rows = Vec::new();
        for (line, result) in rdr.records().enumerate() {
            let rec = match result {
                Ok(rec) => rec,
                Err(e) => {
                    tracing::warn!(line, error = %e, "skipping malformed token row");
                    continue;
                }
            };
            let sent_id = match rec.get(sent_col).and_then(|v| v.trim().parse::<u32>().ok()) {
                Some(id) => id,
                None => {
                    tracing::warn!(line, "skipping token row with unparseable sent_id");
                    continue;
                }
            };
            rows.push(TokenRow {
                sent_id,
                token_id: cell(&rec, token_col),
                word: cell(&rec, word_col),
                claim: cell(&rec, claim_col),
                attr_source: source_col.map(|i| cell(&rec, i)).unwrap_or_else(|| PLACEHOLDER.into()),
                attr_cue: cue_col.map(|i| cell(&rec, i)).unwrap_or_else(|| PLACEHOLDER.into()),
                attr_content: cell(&rec, content_col),
            });
        }

        Ok(Self { rows })
    }

    /// All rows in document order.
    pub fn rows(&self) -> &[TokenRow] {
        &self.rows
    }

    /// Rows whose tag cell for `field` contains `needle`, in document order.
    pub fn rows_tagged(&self, field: AttrField, needle: &str) -> impl Iterator<Item = &TokenRow> {
        self.rows.iter().filter(move |r| r.attr(field).contains(needle))
    }

    /// Rows whose claim tag marks claim membership, in document order.
    pub fn claim_rows(&self) -> impl Iterator<Item = &TokenRow> {
        self.rows.iter().filter(|r| r.claim.contains("claim"))
    }

    /// The `attr_content` values of rows opening an attribution content span.
    pub fn content_begin_tags(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.attr_content.contains("B-content"))
            .map(|r| r.attr_content.as_str())
            .collect()
    }
}
