//! Batch driver: pair input directories, process each document once, commit
//! one storage transaction per document.
//!
//! Directory pairing is the only fail-fast step — if the two listings cannot
//! be matched by filename stem, the batch halts listing every unpairable
//! stem. Per-document failures are logged with the failing stage and the
//! document is skipped; the batch continues. Extraction is embarrassingly
//! parallel (no shared mutable state between documents), so the driver can
//! fan it out across workers and still commit bundles sequentially — a
//! partially processed document is never visible.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::align::TermIndex;
use crate::annotation::conll::TokenTable;
use crate::annotation::naf::NafDocument;
use crate::assemble::{self, AssemblyState};
use crate::config::LinkConfig;
use crate::error::{BatchError, BatchResult, NewslensError};
use crate::extract;
use crate::record::{Attribution, Claim, Document, Entity, Opinion, Perspective, Predicate};
use crate::store::{EntityScope, EntityTable, Store};

/// Which assembly variant the batch runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// Predicate-centric, exact span containment (frame-gated).
    Span,
    /// Claim-centric, similarity joins (claim↔attribution mandatory).
    Fuzzy,
}

/// Batch-level options, loaded once and passed explicitly.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub pipeline: PipelineKind,
    pub link: LinkConfig,
    /// Fan extraction out across worker threads.
    pub parallel: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            pipeline: PipelineKind::Span,
            link: LinkConfig::default(),
            parallel: false,
        }
    }
}

/// One document's pair of annotation sources, matched by filename stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPair {
    pub stem: String,
    /// The flat token table.
    pub table: PathBuf,
    /// The hierarchical annotation document.
    pub naf: PathBuf,
}

/// Metadata sidecar for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocMetadata {
    pub url: String,
    pub publisher: String,
    pub author: String,
}

/// Summary of one batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchSummary {
    /// Documents committed.
    pub documents: usize,
    /// Documents skipped after a per-document failure.
    pub skipped: usize,
    /// Perspectives persisted across the batch.
    pub perspectives: usize,
    pub elapsed: Duration,
}

/// Pair the two input directory listings by filename stem.
///
/// Fails fast when any stem occurs in only one directory, listing every
/// offender. Pairs come back sorted by stem for deterministic processing.
pub fn pair_inputs(table_dir: &Path, naf_dir: &Path) -> BatchResult<Vec<DocumentPair>> {
    let tables = list_by_stem(table_dir)?;
    let nafs = list_by_stem(naf_dir)?;

    let mut unpaired: Vec<String> = Vec::new();
    for stem in tables.keys() {
        if !nafs.contains_key(stem) {
            unpaired.push(stem.clone());
        }
    }
    for stem in nafs.keys() {
        if !tables.contains_key(stem) {
            unpaired.push(stem.clone());
        }
    }
    if !unpaired.is_empty() {
        unpaired.sort();
        return Err(BatchError::UnpairedInput { stems: unpaired });
    }

    Ok(tables
        .into_iter()
        .map(|(stem, table)| {
            let naf = nafs[&stem].clone();
            DocumentPair { stem, table, naf }
        })
        .collect())
}

fn list_by_stem(dir: &Path) -> BatchResult<BTreeMap<String, PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| BatchError::Dir {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut by_stem = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|e| BatchError::Dir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        by_stem.insert(stem.to_string(), path);
    }
    Ok(by_stem)
}

/// Load the eligible-frame list: one frame label per line.
pub fn load_frames(path: &Path) -> BatchResult<BTreeSet<String>> {
    let raw = std::fs::read_to_string(path).map_err(|e| BatchError::Frames {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect())
}

/// Load the document metadata table: tab-separated, header row, columns
/// `stem, url, ..., publisher, author` (publisher and author counted from
/// the row's end, as the table carries a variable middle section).
pub fn load_metadata(path: &Path) -> BatchResult<HashMap<String, DocMetadata>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .map_err(|e| BatchError::Metadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let mut out = HashMap::new();
    for (line, result) in rdr.records().enumerate() {
        let rec = result.map_err(|e| BatchError::Metadata {
            path: path.to_path_buf(),
            message: format!("row {line}: {e}"),
        })?;
        if rec.len() < 4 {
            tracing::warn!(line, "skipping short metadata row");
            continue;
        }
        let stem = rec.get(0).unwrap_or_default().to_string();
        out.insert(
            stem,
            DocMetadata {
                url: rec.get(1).unwrap_or_default().to_string(),
                publisher: rec.get(rec.len() - 3).unwrap_or_default().to_string(),
                author: rec.get(rec.len() - 2).unwrap_or_default().to_string(),
            },
        );
    }
    Ok(out)
}

/// Everything extracted for one document, ready to commit in one
/// transaction.
#[derive(Debug)]
struct DocumentBundle {
    stem: String,
    document: Document,
    claims: Vec<Claim>,
    attributions: Vec<Attribution>,
    predicates: Vec<Predicate>,
    opinions: Vec<Opinion>,
    entities: Vec<Entity>,
    perspectives: Vec<Perspective>,
}

/// A per-document failure, logged and skipped.
#[derive(Debug)]
struct DocumentFailure {
    stem: String,
    stage: &'static str,
    error: NewslensError,
}

fn extract_document(
    pair: &DocumentPair,
    frames: &BTreeSet<String>,
    metadata: &HashMap<String, DocMetadata>,
    options: &BatchOptions,
    batch_entities: &EntityTable,
) -> Result<DocumentBundle, DocumentFailure> {
    let fail = |stage: &'static str, error: NewslensError| DocumentFailure {
        stem: pair.stem.clone(),
        stage,
        error,
    };

    let table =
        TokenTable::from_path(&pair.table).map_err(|e| fail("read-token-table", e.into()))?;
    let naf = NafDocument::from_path(&pair.naf).map_err(|e| fail("read-semantic-layer", e.into()))?;
    let index = TermIndex::build(&naf);

    let claims = extract::claims(&table);
    let attributions = extract::attributions(&table);
    let predicates = extract::predicates(&naf, &index, frames);
    let opinions = extract::opinions(&naf, &index);
    let entities = extract::entities(&naf, &index);

    let meta = metadata.get(&pair.stem).cloned().unwrap_or_else(|| {
        tracing::warn!(document = %pair.stem, "no metadata entry for document");
        DocMetadata::default()
    });
    let document = Document {
        name: pair.stem.clone(),
        text: naf.raw.clone(),
        url: meta.url,
        publisher: meta.publisher,
        author: meta.author,
    };

    let (perspectives, stats) = match options.pipeline {
        PipelineKind::Span => {
            // Span-variant entity resolution is scoped to the current document.
            let doc_entities = EntityTable::from_pairs(
                entities
                    .iter()
                    .map(|e| (e.value.clone(), e.entity_type.clone())),
            );
            assemble::span::assemble(&predicates, &opinions, &entities, &index, &doc_entities)
        }
        PipelineKind::Fuzzy => assemble::fuzzy::assemble(
            &claims,
            &attributions,
            &predicates,
            &opinions,
            batch_entities,
            &options.link,
        ),
    };
    tracing::debug!(
        document = %pair.stem,
        joined = stats.joined,
        discarded = stats.discarded,
        "assembly finished"
    );

    Ok(DocumentBundle {
        stem: pair.stem.clone(),
        document,
        claims,
        attributions,
        predicates,
        opinions,
        entities,
        perspectives,
    })
}

fn commit_bundle<S: Store + ?Sized>(store: &S, bundle: &DocumentBundle) -> BatchResult<usize> {
    let mut txn = store.begin().map_err(BatchError::Store)?;
    let doc_id = txn.write_document(&bundle.document).map_err(BatchError::Store)?;
    for claim in &bundle.claims {
        txn.write_claim(doc_id, claim).map_err(BatchError::Store)?;
    }
    for attribution in &bundle.attributions {
        txn.write_attribution(doc_id, attribution).map_err(BatchError::Store)?;
    }
    for predicate in &bundle.predicates {
        txn.write_predicate(doc_id, predicate).map_err(BatchError::Store)?;
    }
    for opinion in &bundle.opinions {
        txn.write_opinion(doc_id, opinion).map_err(BatchError::Store)?;
    }
    for entity in &bundle.entities {
        txn.write_entity(doc_id, entity).map_err(BatchError::Store)?;
    }
    for perspective in &bundle.perspectives {
        txn.write_perspective(doc_id, perspective).map_err(BatchError::Store)?;
    }
    txn.commit().map_err(BatchError::Store)?;
    Ok(bundle.perspectives.len())
}

/// Process a batch of paired documents against the given store.
///
/// Extraction may run in parallel; commits always happen sequentially, one
/// transaction per document. A storage failure aborts the batch (the
/// failing document's transaction is dropped uncommitted); any other
/// per-document failure is logged and skipped.
pub fn run<S: Store>(
    store: &S,
    pairs: &[DocumentPair],
    frames: &BTreeSet<String>,
    metadata: &HashMap<String, DocMetadata>,
    options: &BatchOptions,
) -> BatchResult<BatchSummary> {
    let started = Instant::now();

    // The fuzzy variant resolves entities against everything previously
    // processed; loaded once per batch.
    let batch_entities = match options.pipeline {
        PipelineKind::Fuzzy => store
            .entity_types(EntityScope::AllDocuments)
            .map_err(BatchError::Store)?,
        PipelineKind::Span => EntityTable::default(),
    };

    let bundles: Vec<Result<DocumentBundle, DocumentFailure>> = if options.parallel {
        pairs
            .par_iter()
            .map(|pair| extract_document(pair, frames, metadata, options, &batch_entities))
            .collect()
    } else {
        pairs
            .iter()
            .map(|pair| extract_document(pair, frames, metadata, options, &batch_entities))
            .collect()
    };

    let mut summary = BatchSummary::default();
    for result in bundles {
        match result {
            Ok(bundle) => {
                let doc_started = Instant::now();
                let persisted = commit_bundle(store, &bundle)?;
                summary.documents += 1;
                summary.perspectives += persisted;
                tracing::info!(
                    document = %bundle.stem,
                    perspectives = persisted,
                    state = %AssemblyState::Persisted,
                    elapsed_ms = doc_started.elapsed().as_millis() as u64,
                    "document committed"
                );
            }
            Err(failure) => {
                summary.skipped += 1;
                tracing::warn!(
                    document = %failure.stem,
                    stage = failure.stage,
                    error = %failure.error,
                    "document skipped"
                );
            }
        }
    }

    summary.elapsed = started.elapsed();
    tracing::info!(
        documents = summary.documents,
        skipped = summary.skipped,
        perspectives = summary.perspectives,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "batch finished"
    );
    Ok(summary)
}
