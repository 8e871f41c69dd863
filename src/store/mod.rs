//! Storage collaborator for fused records.
//!
//! The core's contract with storage is narrow: one write transaction per
//! document, an abstract write per record kind returning the assigned
//! identifier (the Document first, so dependent records can carry its
//! foreign key), and a read of the entity value→type table for source/
//! target resolution. Two backends implement it:
//!
//! - [`mem::MemStore`] — staging in-memory store for tests and dry runs
//! - [`durable::DurableStore`] — redb-backed ACID store
//!
//! Uncommitted transactions are dropped wholesale; a partially processed
//! document is never visible to readers.

pub mod durable;
pub mod mem;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::record::{Attribution, Claim, Document, Entity, Opinion, Perspective, Predicate};

/// Identifier assigned to a persisted document.
pub type DocId = u64;
/// Identifier assigned to any other persisted record.
pub type RecordId = u64;

/// Which documents an entity-table read covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityScope {
    /// All entities across previously processed documents.
    AllDocuments,
    /// Entities within one document.
    Document(DocId),
}

/// Case-insensitive entity value → type table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityTable {
    // lowercased value → (value as stored, type)
    entries: BTreeMap<String, (String, String)>,
}

impl EntityTable {
    /// Build a table from (value, type) pairs. The first entry for a value
    /// (case-insensitively) wins.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries = BTreeMap::new();
        for (value, entity_type) in pairs {
            entries
                .entry(value.to_lowercase())
                .or_insert((value, entity_type));
        }
        Self { entries }
    }

    /// Case-insensitive lookup: returns (value as stored, type).
    pub fn get(&self, value: &str) -> Option<(&str, &str)> {
        self.entries
            .get(&value.to_lowercase())
            .map(|(v, t)| (v.as_str(), t.as_str()))
    }

    /// Stored (value, type) pairs in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.values().map(|(v, t)| (v.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything persisted for one document, for export and inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentExport {
    pub id: DocId,
    pub document: Document,
    pub claims: Vec<Claim>,
    pub attributions: Vec<Attribution>,
    pub predicates: Vec<Predicate>,
    pub opinions: Vec<Opinion>,
    pub entities: Vec<Entity>,
    pub perspectives: Vec<Perspective>,
}

/// One document's write transaction.
///
/// Writes are not visible to readers until [`DocumentTxn::commit`]; dropping
/// the transaction discards everything staged in it.
pub trait DocumentTxn {
    /// Persist the document record, returning its assigned identifier.
    /// Must be called before any dependent write.
    fn write_document(&mut self, doc: &Document) -> StoreResult<DocId>;
    fn write_claim(&mut self, doc: DocId, claim: &Claim) -> StoreResult<RecordId>;
    fn write_attribution(&mut self, doc: DocId, attribution: &Attribution) -> StoreResult<RecordId>;
    fn write_predicate(&mut self, doc: DocId, predicate: &Predicate) -> StoreResult<RecordId>;
    fn write_opinion(&mut self, doc: DocId, opinion: &Opinion) -> StoreResult<RecordId>;
    fn write_entity(&mut self, doc: DocId, entity: &Entity) -> StoreResult<RecordId>;
    fn write_perspective(&mut self, doc: DocId, perspective: &Perspective) -> StoreResult<RecordId>;
    /// Commit every staged write atomically.
    fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// The storage collaborator consumed by the pipeline.
pub trait Store {
    /// Open a write transaction for one document.
    fn begin(&self) -> StoreResult<Box<dyn DocumentTxn + '_>>;

    /// The entity value→type table over the given scope.
    fn entity_types(&self, scope: EntityScope) -> StoreResult<EntityTable>;

    /// Identifier of a previously committed document, by stem.
    fn document_id(&self, stem: &str) -> StoreResult<Option<DocId>>;

    /// All committed documents, in identifier order.
    fn documents(&self) -> StoreResult<Vec<(DocId, Document)>>;

    /// Every committed record for the document with the given stem.
    fn export_document(&self, stem: &str) -> StoreResult<Option<DocumentExport>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_table_lookup_is_case_insensitive() {
        let table = EntityTable::from_pairs(vec![("Mayor Smith".to_string(), "PER".to_string())]);
        let (value, entity_type) = table.get("mayor smith").unwrap();
        assert_eq!(value, "Mayor Smith");
        assert_eq!(entity_type, "PER");
        assert!(table.get("mayor jones").is_none());
    }

    #[test]
    fn entity_table_first_entry_wins() {
        let table = EntityTable::from_pairs(vec![
            ("Mayor Smith".to_string(), "PER".to_string()),
            ("MAYOR SMITH".to_string(), "ORG".to_string()),
        ]);
        assert_eq!(table.get("Mayor Smith").unwrap().1, "PER");
        assert_eq!(table.len(), 1);
    }
}
