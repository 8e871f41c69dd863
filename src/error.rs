//! Rich diagnostic error types for the newslens engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains. Absent fuzzy/exact join
//! candidates are deliberately NOT errors — lookups that can come up empty
//! return `Option` instead (a "no attachment" outcome is a normal result).

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the newslens engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source chains) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum NewslensError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Annotation(#[from] AnnotationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Align(#[from] AlignError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Batch(#[from] BatchError),
}

// ---------------------------------------------------------------------------
// Annotation reader errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum AnnotationError {
    #[error("I/O error reading {}: {source}", .path.display())]
    #[diagnostic(
        code(newslens::annotation::io),
        help(
            "The annotation file could not be read. Check that the path exists \
             and has read permissions."
        )
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed token table: {message}")]
    #[diagnostic(
        code(newslens::annotation::table),
        help(
            "The tab-delimited token table could not be parsed. Verify the file \
             is tab-separated with a header row."
        )
    )]
    Table { message: String },

    #[error("token table is missing required column \"{column}\"")]
    #[diagnostic(
        code(newslens::annotation::missing_column),
        help(
            "The token table header must include at least sent_id, token_id, \
             word, claim, and attr_content. Check that the header row was not \
             stripped from the file."
        )
    )]
    MissingColumn { column: String },

    #[error("malformed annotation document: {message}")]
    #[diagnostic(
        code(newslens::annotation::xml),
        help(
            "The hierarchical annotation XML could not be parsed. Verify the \
             file is well-formed NAF/KAF output."
        )
    )]
    Xml { message: String },

    #[error("annotation document contains no token layer")]
    #[diagnostic(
        code(newslens::annotation::empty),
        help(
            "The hierarchical document has no <text>/<wf> elements, so nothing \
             can be aligned. The upstream annotation run likely failed."
        )
    )]
    EmptyTokenLayer,
}

// ---------------------------------------------------------------------------
// Alignment errors
// ---------------------------------------------------------------------------

/// Structural mismatches between the two annotation layers.
///
/// These are recoverable: the caller skips the offending record and
/// continues with the rest of the document.
#[derive(Debug, Error, Diagnostic)]
pub enum AlignError {
    #[error("term {term_id} referenced by the semantic layer has no token")]
    #[diagnostic(
        code(newslens::align::unknown_term),
        help(
            "The hierarchical layer references an identifier absent from the \
             token stream. The two annotation sources disagree; the offending \
             record is skipped, the rest of the document is processed normally."
        )
    )]
    UnknownTerm { term_id: String },

    #[error("identifier \"{id}\" is not in word or term space")]
    #[diagnostic(
        code(newslens::align::bad_identifier),
        help(
            "Token identifiers are expected to look like w12 (word space) or \
             t12 (term space). Check the annotation source that produced this id."
        )
    )]
    BadIdentifier { id: String },
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(newslens::store::io),
        help(
            "A filesystem operation failed. Check that the data directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("storage backend error: {message}")]
    #[diagnostic(
        code(newslens::store::backend),
        help(
            "The embedded database rejected the operation. The document's \
             transaction is aborted; no partial records were committed. \
             If the problem persists, try a fresh data directory."
        )
    )]
    Backend { message: String },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(newslens::store::serde),
        help(
            "Failed to serialize or deserialize a stored record. This usually \
             means the stored data format changed between versions. \
             Re-ingest the affected documents."
        )
    )]
    Serialization { message: String },

    #[error("document not found: \"{stem}\"")]
    #[diagnostic(
        code(newslens::store::not_found),
        help("No document with this stem has been ingested. List documents with `newslens list`.")
    )]
    DocumentNotFound { stem: String },

    #[error("duplicate document: \"{stem}\" already exists")]
    #[diagnostic(
        code(newslens::store::duplicate),
        help(
            "A document with this stem was already ingested. Remove it first \
             or use a fresh data directory."
        )
    )]
    DuplicateDocument { stem: String },
}

// ---------------------------------------------------------------------------
// Batch errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum BatchError {
    #[error(
        "unpairable inputs: {} document stem(s) present in only one directory: {}",
        .stems.len(),
        .stems.join(", ")
    )]
    #[diagnostic(
        code(newslens::batch::unpaired_input),
        help(
            "Every document needs both a token table and a hierarchical \
             annotation file sharing the same filename stem. Stems listed in \
             the error occur in only one of the two directories."
        )
    )]
    UnpairedInput { stems: Vec<String> },

    #[error("cannot list input directory {}: {source}", .path.display())]
    #[diagnostic(
        code(newslens::batch::dir),
        help("Check that both input directories exist and are readable.")
    )]
    Dir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load eligible-frame list {}: {source}", .path.display())]
    #[diagnostic(
        code(newslens::batch::frames),
        help(
            "The eligible-frame list is a plain text file with one frame label \
             per line. Pass it with --frames."
        )
    )]
    Frames {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot load document metadata table {}: {message}", .path.display())]
    #[diagnostic(
        code(newslens::batch::metadata),
        help(
            "The metadata table is tab-separated with a header row and at least \
             the columns: stem, url, publisher, author."
        )
    )]
    Metadata { path: PathBuf, message: String },

    #[error("invalid configuration file {}: {message}", .path.display())]
    #[diagnostic(
        code(newslens::batch::config),
        help("The configuration file must be valid TOML. See LinkConfig for the accepted keys.")
    )]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias for annotation reader results.
pub type AnnotationResult<T> = std::result::Result<T, AnnotationError>;
/// Convenience alias for alignment results.
pub type AlignResult<T> = std::result::Result<T, AlignError>;
/// Convenience alias for store results.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
/// Convenience alias for batch results.
pub type BatchResult<T> = std::result::Result<T, BatchError>;
/// Convenience alias for functions returning newslens results.
pub type NewslensResult<T> = std::result::Result<T, NewslensError>;
