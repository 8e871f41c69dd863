//! Durable-store integration tests: round-trips, transaction isolation,
//! and cross-run identifier stability.

use newslens::error::{BatchError, StoreError};
use newslens::record::{Claim, Document, Entity, Perspective};
use newslens::store::durable::DurableStore;
use newslens::store::{EntityScope, Store};
use tempfile::TempDir;

fn document(stem: &str) -> Document {
    Document {
        name: stem.into(),
        text: "The mayor rejected the plan.".into(),
        url: format!("https://example.org/{stem}"),
        publisher: "The Paper".into(),
        author: "A. Writer".into(),
    }
}

fn entity(value: &str, entity_type: &str) -> Entity {
    Entity {
        value: value.into(),
        entity_type: entity_type.into(),
        sent_id: 1,
        span: vec!["t1".into()],
    }
}

#[test]
fn document_round_trip_across_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = DurableStore::open(dir.path()).unwrap();
        let mut txn = store.begin().unwrap();
        let id = txn.write_document(&document("article-1")).unwrap();
        txn.write_claim(
            id,
            &Claim {
                value: "The mayor rejected the plan".into(),
                sent_id: 1,
                token_ids: vec!["w1".into(), "w2".into()],
            },
        )
        .unwrap();
        txn.commit().unwrap();
    }

    // Reopen from disk: identical name/text/metadata fields.
    let store = DurableStore::open(dir.path()).unwrap();
    let export = store.export_document("article-1").unwrap().unwrap();
    assert_eq!(export.document, document("article-1"));
    assert_eq!(export.claims.len(), 1);
    assert_eq!(export.claims[0].sent_id, 1);
}

#[test]
fn uncommitted_document_never_visible() {
    let dir = TempDir::new().unwrap();
    let store = DurableStore::open(dir.path()).unwrap();

    {
        let mut txn = store.begin().unwrap();
        let id = txn.write_document(&document("partial")).unwrap();
        txn.write_entity(id, &entity("Mayor Smith", "PER")).unwrap();
        // Transaction dropped: everything staged is discarded.
    }

    assert!(store.export_document("partial").unwrap().is_none());
    assert!(
        store
            .entity_types(EntityScope::AllDocuments)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn entity_table_scopes_and_case_insensitivity() {
    let dir = TempDir::new().unwrap();
    let store = DurableStore::open(dir.path()).unwrap();

    let mut txn = store.begin().unwrap();
    let a = txn.write_document(&document("a")).unwrap();
    txn.write_entity(a, &entity("Mayor Smith", "PER")).unwrap();
    txn.commit().unwrap();

    let mut txn = store.begin().unwrap();
    let b = txn.write_document(&document("b")).unwrap();
    txn.write_entity(b, &entity("Acme Corp", "ORG")).unwrap();
    txn.commit().unwrap();

    let all = store.entity_types(EntityScope::AllDocuments).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("mayor smith").unwrap(), ("Mayor Smith", "PER"));

    let scoped = store.entity_types(EntityScope::Document(a)).unwrap();
    assert_eq!(scoped.len(), 1);
    assert!(scoped.get("acme corp").is_none());
}

#[test]
fn perspectives_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = DurableStore::open(dir.path()).unwrap();

    let perspective = Perspective {
        source: "The mayor".into(),
        cue: "rejected".into(),
        statement: "The mayor rejected the plan".into(),
        statement_span: vec![("t1".into(), "The".into()), ("t2".into(), "mayor".into())],
        frame: Some("Statement".into()),
        roles: None,
        opinions: vec![],
        sentiment: Some(newslens::sentiment::PolarityLabel::Neutral),
        cue_sentiment: None,
        source_entity: None,
        target_entity: None,
        order: Some(0),
        sent_id: 1,
    };

    let mut txn = store.begin().unwrap();
    let id = txn.write_document(&document("a")).unwrap();
    txn.write_perspective(id, &perspective).unwrap();
    txn.commit().unwrap();

    let export = store.export_document("a").unwrap().unwrap();
    assert_eq!(export.perspectives.len(), 1);
    assert_eq!(export.perspectives[0], perspective);
}

#[test]
fn duplicate_ingest_surfaces_as_storage_failure() {
    let dir = TempDir::new().unwrap();
    let store = DurableStore::open(dir.path()).unwrap();

    let mut txn = store.begin().unwrap();
    txn.write_document(&document("a")).unwrap();
    txn.commit().unwrap();

    let mut txn = store.begin().unwrap();
    let err = txn.write_document(&document("a")).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateDocument { .. }));
    // And it converts into the batch-level taxonomy unchanged.
    let batch: BatchError = err.into();
    assert!(matches!(batch, BatchError::Store(StoreError::DuplicateDocument { .. })));
}
