//! ACID-durable record store backed by redb.
//!
//! One table per record kind, values bincode-encoded. All writes for a
//! document go through a single [`DocumentTxn`]; redb aborts the
//! transaction on drop, so an uncommitted document leaves nothing behind.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{StoreError, StoreResult};
use crate::record::{Attribution, Claim, Document, Entity, Opinion, Perspective, Predicate};
use crate::store::{DocId, DocumentExport, DocumentTxn, EntityScope, EntityTable, RecordId, Store};

const DOCUMENTS: TableDefinition<u64, &[u8]> = TableDefinition::new("documents");
/// Stem → document id, for pairing dependent reads and duplicate checks.
const DOCUMENT_NAMES: TableDefinition<&str, u64> = TableDefinition::new("document_names");
const CLAIMS: TableDefinition<u64, &[u8]> = TableDefinition::new("claims");
const ATTRIBUTIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("attributions");
const PREDICATES: TableDefinition<u64, &[u8]> = TableDefinition::new("predicates");
const OPINIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("opinions");
const ENTITIES: TableDefinition<u64, &[u8]> = TableDefinition::new("entities");
const PERSPECTIVES: TableDefinition<u64, &[u8]> = TableDefinition::new("perspectives");
/// Identifier allocator state.
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

fn backend<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Backend {
        message: e.to_string(),
    }
}

fn encode<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

/// Durable storage backend.
pub struct DurableStore {
    db: Arc<Database>,
}

impl DurableStore {
    /// Open or create a store in the given data directory.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Io { source: e })?;
        let db_path = data_dir.join("newslens.redb");
        let db = Database::create(&db_path)
            .map_err(|e| backend(format!("failed to open redb at {}: {e}", db_path.display())))?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Read every `(id, doc_id, record)` row of a record table. A table that
    /// was never written reads as empty.
    fn scan<T: DeserializeOwned>(
        &self,
        def: TableDefinition<'static, u64, &'static [u8]>,
    ) -> StoreResult<Vec<(RecordId, DocId, T)>> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = match txn.open_table(def) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(backend(e)),
        };
        let mut rows = Vec::new();
        for item in table.iter().map_err(backend)? {
            let (key, value) = item.map_err(backend)?;
            let (doc_id, record): (DocId, T) = decode(value.value())?;
            rows.push((key.value(), doc_id, record));
        }
        Ok(rows)
    }
}

impl std::fmt::Debug for DurableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurableStore").finish()
    }
}

/// A document's write transaction over the redb backend.
pub struct RedbTxn {
    txn: redb::WriteTransaction,
    next_id: u64,
}

impl RedbTxn {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn append<T: Serialize>(
        &mut self,
        def: TableDefinition<'static, u64, &'static [u8]>,
        doc: DocId,
        record: &T,
    ) -> StoreResult<RecordId> {
        let id = self.next_id();
        let bytes = encode(&(doc, record))?;
        let mut table = self.txn.open_table(def).map_err(backend)?;
        table.insert(id, bytes.as_slice()).map_err(backend)?;
        Ok(id)
    }
}

impl DocumentTxn for RedbTxn {
    fn write_document(&mut self, doc: &Document) -> StoreResult<DocId> {
        {
            let names = self.txn.open_table(DOCUMENT_NAMES).map_err(backend)?;
            if names.get(doc.name.as_str()).map_err(backend)?.is_some() {
                return Err(StoreError::DuplicateDocument {
                    stem: doc.name.clone(),
                });
            }
        }
        let id = self.next_id();
        let bytes = encode(doc)?;
        {
            let mut table = self.txn.open_table(DOCUMENTS).map_err(backend)?;
            table.insert(id, bytes.as_slice()).map_err(backend)?;
        }
        {
            let mut names = self.txn.open_table(DOCUMENT_NAMES).map_err(backend)?;
            names.insert(doc.name.as_str(), id).map_err(backend)?;
        }
        Ok(id)
    }

    fn write_claim(&mut self, doc: DocId, claim: &Claim) -> StoreResult<RecordId> {
        self.append(CLAIMS, doc, claim)
    }

    fn write_attribution(&mut self, doc: DocId, attribution: &Attribution) -> StoreResult<RecordId> {
        self.append(ATTRIBUTIONS, doc, attribution)
    }

    fn write_predicate(&mut self, doc: DocId, predicate: &Predicate) -> StoreResult<RecordId> {
        self.append(PREDICATES, doc, predicate)
    }

    fn write_opinion(&mut self, doc: DocId, opinion: &Opinion) -> StoreResult<RecordId> {
        self.append(OPINIONS, doc, opinion)
    }

    fn write_entity(&mut self, doc: DocId, entity: &Entity) -> StoreResult<RecordId> {
        self.append(ENTITIES, doc, entity)
    }

    fn write_perspective(&mut self, doc: DocId, perspective: &Perspective) -> StoreResult<RecordId> {
        self.append(PERSPECTIVES, doc, perspective)
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        let this = *self;
        {
            let mut meta = this.txn.open_table(META).map_err(backend)?;
            meta.insert("next_id", this.next_id).map_err(backend)?;
        }
        this.txn.commit().map_err(backend)
    }
}

impl Store for DurableStore {
    fn begin(&self) -> StoreResult<Box<dyn DocumentTxn + '_>> {
        let txn = self.db.begin_write().map_err(backend)?;
        let next_id = {
            let meta = txn.open_table(META).map_err(backend)?;
            meta.get("next_id")
                .map_err(backend)?
                .map(|guard| guard.value())
                .unwrap_or(1)
        };
        Ok(Box::new(RedbTxn { txn, next_id }))
    }

    fn entity_types(&self, scope: EntityScope) -> StoreResult<EntityTable> {
        let rows: Vec<(RecordId, DocId, Entity)> = self.scan(ENTITIES)?;
        let pairs = rows
            .into_iter()
            .filter(|(_, doc, _)| match scope {
                EntityScope::AllDocuments => true,
                EntityScope::Document(id) => *doc == id,
            })
            .map(|(_, _, e)| (e.value, e.entity_type));
        Ok(EntityTable::from_pairs(pairs))
    }

    fn document_id(&self, stem: &str) -> StoreResult<Option<DocId>> {
        let txn = self.db.begin_read().map_err(backend)?;
        let names = match txn.open_table(DOCUMENT_NAMES) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(backend(e)),
        };
        Ok(names
            .get(stem)
            .map_err(backend)?
            .map(|guard| guard.value()))
    }

    fn documents(&self) -> StoreResult<Vec<(DocId, Document)>> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = match txn.open_table(DOCUMENTS) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(backend(e)),
        };
        let mut docs = Vec::new();
        for item in table.iter().map_err(backend)? {
            let (key, value) = item.map_err(backend)?;
            docs.push((key.value(), decode(value.value())?));
        }
        Ok(docs)
    }

    fn export_document(&self, stem: &str) -> StoreResult<Option<DocumentExport>> {
        let Some(id) = self.document_id(stem)? else {
            return Ok(None);
        };
        let document = self
            .documents()?
            .into_iter()
            .find(|(doc_id, _)| *doc_id == id)
            .map(|(_, d)| d)
            .ok_or_else(|| StoreError::DocumentNotFound { stem: stem.into() })?;

        fn only<T>(rows: Vec<(RecordId, DocId, T)>, doc: DocId) -> Vec<T> {
            rows.into_iter()
                .filter(|(_, d, _)| *d == doc)
                .map(|(_, _, r)| r)
                .collect()
        }

        Ok(Some(DocumentExport {
            id,
            document,
            claims: only(self.scan(CLAIMS)?, id),
            attributions: only(self.scan(ATTRIBUTIONS)?, id),
            predicates: only(self.scan(PREDICATES)?, id),
            opinions: only(self.scan(OPINIONS)?, id),
            entities: only(self.scan(ENTITIES)?, id),
            perspectives: only(self.scan(PERSPECTIVES)?, id),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(name: &str) -> Document {
        Document {
            name: name.into(),
            text: "Full text.".into(),
            url: "https://example.org".into(),
            publisher: "The Paper".into(),
            author: "A. Writer".into(),
        }
    }

    #[test]
    fn document_round_trip_by_stem() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();

        let mut txn = store.begin().unwrap();
        let id = txn.write_document(&doc("article-1")).unwrap();
        txn.commit().unwrap();

        assert_eq!(store.document_id("article-1").unwrap(), Some(id));
        let export = store.export_document("article-1").unwrap().unwrap();
        assert_eq!(export.document, doc("article-1"));
    }

    #[test]
    fn dropped_txn_commits_nothing() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        {
            let mut txn = store.begin().unwrap();
            txn.write_document(&doc("ghost")).unwrap();
            // dropped without commit
        }
        assert_eq!(store.document_id("ghost").unwrap(), None);
        assert!(store.documents().unwrap().is_empty());
    }

    #[test]
    fn ids_stay_unique_across_reopens() {
        let dir = TempDir::new().unwrap();
        let first_id;
        {
            let store = DurableStore::open(dir.path()).unwrap();
            let mut txn = store.begin().unwrap();
            first_id = txn.write_document(&doc("a")).unwrap();
            txn.commit().unwrap();
        }
        let store = DurableStore::open(dir.path()).unwrap();
        let mut txn = store.begin().unwrap();
        let second_id = txn.write_document(&doc("b")).unwrap();
        txn.commit().unwrap();
        assert!(second_id > first_id);
    }

    #[test]
    fn duplicate_stem_rejected() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        let mut txn = store.begin().unwrap();
        txn.write_document(&doc("a")).unwrap();
        txn.commit().unwrap();

        let mut txn = store.begin().unwrap();
        let err = txn.write_document(&doc("a")).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateDocument { .. }));
    }

    #[test]
    fn empty_store_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = DurableStore::open(dir.path()).unwrap();
        assert!(store.documents().unwrap().is_empty());
        assert!(store.entity_types(EntityScope::AllDocuments).unwrap().is_empty());
        assert!(store.export_document("nope").unwrap().is_none());
    }
}
