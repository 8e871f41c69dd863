//! In-memory store: staging backend for tests and dry runs.
//!
//! Mirrors the durable backend's transactional contract — staged writes
//! become visible only on commit, and a dropped transaction leaves no
//! trace — without touching the filesystem.

use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::record::{Attribution, Claim, Document, Entity, Opinion, Perspective, Predicate};
use crate::store::{DocId, DocumentExport, DocumentTxn, EntityScope, EntityTable, RecordId, Store};

#[derive(Debug, Default)]
struct Inner {
    documents: Vec<(DocId, Document)>,
    claims: Vec<(RecordId, DocId, Claim)>,
    attributions: Vec<(RecordId, DocId, Attribution)>,
    predicates: Vec<(RecordId, DocId, Predicate)>,
    opinions: Vec<(RecordId, DocId, Opinion)>,
    entities: Vec<(RecordId, DocId, Entity)>,
    perspectives: Vec<(RecordId, DocId, Perspective)>,
    next_id: u64,
}

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::Backend {
            message: "memory store lock poisoned".into(),
        })
    }
}

/// Staged writes for one document, merged into the store on commit.
pub struct MemTxn<'a> {
    store: &'a MemStore,
    staged: Inner,
}

impl MemTxn<'_> {
    fn next_id(&mut self) -> u64 {
        let id = self.staged.next_id;
        self.staged.next_id += 1;
        id
    }
}

impl DocumentTxn for MemTxn<'_> {
    fn write_document(&mut self, doc: &Document) -> StoreResult<DocId> {
        let duplicate = self
            .store
            .lock()?
            .documents
            .iter()
            .any(|(_, d)| d.name == doc.name);
        if duplicate {
            return Err(StoreError::DuplicateDocument {
                stem: doc.name.clone(),
            });
        }
        let id = self.next_id();
        self.staged.documents.push((id, doc.clone()));
        Ok(id)
    }

    fn write_claim(&mut self, doc: DocId, claim: &Claim) -> StoreResult<RecordId> {
        let id = self.next_id();
        self.staged.claims.push((id, doc, claim.clone()));
        Ok(id)
    }

    fn write_attribution(&mut self, doc: DocId, attribution: &Attribution) -> StoreResult<RecordId> {
        let id = self.next_id();
        self.staged.attributions.push((id, doc, attribution.clone()));
        Ok(id)
    }

    fn write_predicate(&mut self, doc: DocId, predicate: &Predicate) -> StoreResult<RecordId> {
        let id = self.next_id();
        self.staged.predicates.push((id, doc, predicate.clone()));
        Ok(id)
    }

    fn write_opinion(&mut self, doc: DocId, opinion: &Opinion) -> StoreResult<RecordId> {
        let id = self.next_id();
        self.staged.opinions.push((id, doc, opinion.clone()));
        Ok(id)
    }

    fn write_entity(&mut self, doc: DocId, entity: &Entity) -> StoreResult<RecordId> {
        let id = self.next_id();
        self.staged.entities.push((id, doc, entity.clone()));
        Ok(id)
    }

    fn write_perspective(&mut self, doc: DocId, perspective: &Perspective) -> StoreResult<RecordId> {
        let id = self.next_id();
        self.staged.perspectives.push((id, doc, perspective.clone()));
        Ok(id)
    }

    fn commit(self: Box<Self>) -> StoreResult<()> {
        let staged = self.staged;
        let mut inner = self.store.lock()?;
        inner.documents.extend(staged.documents);
        inner.claims.extend(staged.claims);
        inner.attributions.extend(staged.attributions);
        inner.predicates.extend(staged.predicates);
        inner.opinions.extend(staged.opinions);
        inner.entities.extend(staged.entities);
        inner.perspectives.extend(staged.perspectives);
        inner.next_id = inner.next_id.max(staged.next_id);
        Ok(())
    }
}

impl Store for MemStore {
    fn begin(&self) -> StoreResult<Box<dyn DocumentTxn + '_>> {
        let next_id = self.lock()?.next_id;
        Ok(Box::new(MemTxn {
            store: self,
            staged: Inner {
                next_id,
                ..Default::default()
            },
        }))
    }

    fn entity_types(&self, scope: EntityScope) -> StoreResult<EntityTable> {
        let inner = self.lock()?;
        let pairs = inner
            .entities
            .iter()
            .filter(|(_, doc, _)| match scope {
                EntityScope::AllDocuments => true,
                EntityScope::Document(id) => *doc == id,
            })
            .map(|(_, _, e)| (e.value.clone(), e.entity_type.clone()));
        Ok(EntityTable::from_pairs(pairs))
    }

    fn document_id(&self, stem: &str) -> StoreResult<Option<DocId>> {
        Ok(self
            .lock()?
            .documents
            .iter()
            .find(|(_, d)| d.name == stem)
            .map(|(id, _)| *id))
    }

    fn documents(&self) -> StoreResult<Vec<(DocId, Document)>> {
        let mut docs = self.lock()?.documents.clone();
        docs.sort_by_key(|(id, _)| *id);
        Ok(docs)
    }

    fn export_document(&self, stem: &str) -> StoreResult<Option<DocumentExport>> {
        let inner = self.lock()?;
        let Some((id, document)) = inner
            .documents
            .iter()
            .find(|(_, d)| d.name == stem)
            .map(|(id, d)| (*id, d.clone()))
        else {
            return Ok(None);
        };

        fn collect<T: Clone>(rows: &[(RecordId, DocId, T)], doc: DocId) -> Vec<T> {
            rows.iter()
                .filter(|(_, d, _)| *d == doc)
                .map(|(_, _, r)| r.clone())
                .collect()
        }

        Ok(Some(DocumentExport {
            id,
            document,
            claims: collect(&inner.claims, id),
            attributions: collect(&inner.attributions, id),
            predicates: collect(&inner.predicates, id),
            opinions: collect(&inner.opinions, id),
            entities: collect(&inner.entities, id),
            perspectives: collect(&inner.perspectives, id),
        }))
    }
}
