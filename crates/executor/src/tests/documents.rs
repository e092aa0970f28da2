//! Tests for the document command handlers.
//!
//! Documents are seeded straight into the memory store, including with the
//! string ids older clients wrote, then driven through the executor.

use std::sync::Arc;

use docadmin_core::{doc, DateTime, ObjectId, Value};
use docadmin_engine::{MemoryStore, Store};
use serde_json::json;

use super::create_test_executor;
use crate::{Command, ConsoleConfig, Error, Executor, Output};

const HEX: &str = "6945cd5054b616d899e8f4e8";

fn oid() -> ObjectId {
    ObjectId::parse_str(HEX).unwrap()
}

fn find(executor: &Executor, id: serde_json::Value) -> crate::Result<Output> {
    executor.execute(Command::FindDocument {
        database: None,
        collection: "items".to_string(),
        id,
    })
}

fn seed(store: &MemoryStore, id: Value) {
    store
        .memory_collection("mongoadmin", "items")
        .insert_raw(doc! { "_id" => id, "name" => "seeded" });
}

// =============================================================================
// ListDocuments
// =============================================================================

#[test]
fn test_list_documents_pages() {
    let (executor, store) = create_test_executor();
    let col = store.memory_collection("mongoadmin", "items");
    for i in 0..30i64 {
        col.insert_raw(doc! { "_id" => i, "i" => i });
    }

    let out = executor
        .execute(Command::ListDocuments {
            database: None,
            collection: "items".to_string(),
            page: Some(2),
        })
        .unwrap();
    match out {
        Output::DocumentPage(page) => {
            assert_eq!(page.total, 30);
            assert_eq!(page.page, 2);
            assert_eq!(page.limit, 25);
            assert_eq!(page.data.len(), 5);
            assert_eq!(page.data[0]["i"], json!(25));
        }
        other => panic!("Expected DocumentPage, got {:?}", other),
    }
}

#[test]
fn test_list_documents_page_zero_is_first_page() {
    let (executor, store) = create_test_executor();
    seed(&store, Value::ObjectId(oid()));

    for page in [None, Some(0)] {
        match executor
            .execute(Command::ListDocuments {
                database: None,
                collection: "items".to_string(),
                page,
            })
            .unwrap()
        {
            Output::DocumentPage(p) => {
                assert_eq!(p.page, 1);
                assert_eq!(p.data.len(), 1);
                assert_eq!(p.data[0]["_id"], json!({ "$oid": HEX }));
            }
            other => panic!("Expected DocumentPage, got {:?}", other),
        }
    }
}

#[test]
fn test_list_documents_past_the_end() {
    let (executor, _) = create_test_executor();
    match executor
        .execute(Command::ListDocuments {
            database: None,
            collection: "items".to_string(),
            page: Some(u64::MAX),
        })
        .unwrap()
    {
        Output::DocumentPage(p) => assert!(p.data.is_empty()),
        other => panic!("Expected DocumentPage, got {:?}", other),
    }
}

#[test]
fn test_canonical_output_mode() {
    let store = Arc::new(MemoryStore::new());
    store
        .memory_collection("mongoadmin", "items")
        .insert_raw(doc! { "_id" => oid(), "n" => 1i64 });
    let config = ConsoleConfig {
        output: "canonical".to_string(),
        ..Default::default()
    };
    let executor = Executor::new(store as Arc<dyn Store>, config).unwrap();

    match find(&executor, json!(HEX)).unwrap() {
        Output::Document(doc) => assert_eq!(doc["n"], json!({ "$numberLong": "1" })),
        other => panic!("Expected Document, got {:?}", other),
    }
}

// =============================================================================
// FindDocument
// =============================================================================

#[test]
fn test_find_typed_id_by_every_representation() {
    let (executor, store) = create_test_executor();
    seed(&store, Value::ObjectId(oid()));

    let buffer: serde_json::Map<String, serde_json::Value> = oid()
        .bytes()
        .iter()
        .enumerate()
        .map(|(i, b)| (i.to_string(), json!(b)))
        .collect();

    for id in [
        json!(HEX),
        json!({ "$oid": HEX }),
        json!(format!("{{\"$oid\":\"{}\"}}", HEX)),
        json!({ "buffer": buffer }),
    ] {
        match find(&executor, id.clone()) {
            Ok(Output::Document(doc)) => assert_eq!(doc["name"], json!("seeded")),
            other => panic!("{} did not resolve: {:?}", id, other),
        }
    }
}

#[test]
fn test_find_string_id_by_wrapper() {
    let (executor, store) = create_test_executor();
    seed(&store, Value::from(HEX));

    match find(&executor, json!({ "$oid": HEX })).unwrap() {
        Output::Document(doc) => assert_eq!(doc["_id"], json!(HEX)),
        other => panic!("Expected Document, got {:?}", other),
    }
}

#[test]
fn test_find_opaque_id_matches_exactly() {
    let (executor, store) = create_test_executor();
    seed(&store, Value::from("legacy-key"));

    assert!(find(&executor, json!("legacy-key")).is_ok());
    assert!(matches!(
        find(&executor, json!("legacy-KEY")),
        Err(Error::DocumentNotFound { .. })
    ));
}

#[test]
fn test_find_requires_id() {
    let (executor, _) = create_test_executor();
    assert_eq!(
        find(&executor, serde_json::Value::Null).unwrap_err(),
        Error::MissingField {
            field: "id".to_string()
        }
    );
}

// =============================================================================
// InsertDocument
// =============================================================================

#[test]
fn test_insert_normalizes_payload() {
    let (executor, store) = create_test_executor();

    let out = executor
        .execute(Command::InsertDocument {
            database: None,
            collection: "items".to_string(),
            data: json!({
                "name": "a",
                "ref": HEX,
                "when": { "$date": "2024-01-01T00:00:00Z" },
                "tags": [HEX]
            }),
        })
        .unwrap();
    assert!(matches!(out, Output::Inserted { .. }));

    let docs = store.memory_collection("mongoadmin", "items").documents();
    let stored = &docs[0];
    assert!(matches!(stored.id(), Some(Value::ObjectId(_))));
    assert_eq!(stored.get("ref"), Some(&Value::ObjectId(oid())));
    assert_eq!(
        stored.get("when"),
        Some(&Value::DateTime(DateTime::from_millis(1_704_067_200_000)))
    );
    assert_eq!(
        stored.get("tags"),
        Some(&Value::Array(vec![Value::from(HEX)]))
    );
}

#[test]
fn test_insert_hex_id_stored_typed() {
    let (executor, store) = create_test_executor();
    let out = executor
        .execute(Command::InsertDocument {
            database: None,
            collection: "items".to_string(),
            data: json!({ "_id": HEX }),
        })
        .unwrap();
    assert_eq!(
        out,
        Output::Inserted {
            id: json!({ "$oid": HEX })
        }
    );
    let docs = store.memory_collection("mongoadmin", "items").documents();
    assert_eq!(docs[0].id(), Some(&Value::ObjectId(oid())));
}

#[test]
fn test_insert_duplicate_is_write_failure() {
    let (executor, store) = create_test_executor();
    seed(&store, Value::ObjectId(oid()));

    let err = executor
        .execute(Command::InsertDocument {
            database: None,
            collection: "items".to_string(),
            data: json!({ "_id": { "$oid": HEX } }),
        })
        .unwrap_err();
    assert!(matches!(err, Error::WriteFailed { .. }));
}

#[test]
fn test_insert_rejects_non_object() {
    let (executor, _) = create_test_executor();
    let insert = |data| {
        executor.execute(Command::InsertDocument {
            database: None,
            collection: "items".to_string(),
            data,
        })
    };
    assert!(matches!(
        insert(json!([1, 2])),
        Err(Error::InvalidInput { .. })
    ));
    assert!(matches!(
        insert(serde_json::Value::Null),
        Err(Error::MissingField { .. })
    ));
}

// =============================================================================
// UpdateDocument
// =============================================================================

#[test]
fn test_update_string_id_document_by_hex() {
    let (executor, store) = create_test_executor();
    seed(&store, Value::from(HEX));

    let out = executor
        .execute(Command::UpdateDocument {
            database: None,
            collection: "items".to_string(),
            id: json!(HEX),
            data: json!({ "_id": "ignored", "name": "renamed", "owner": HEX }),
        })
        .unwrap();
    assert_eq!(
        out,
        Output::Updated {
            matched: 1,
            modified: 1
        }
    );

    let docs = store.memory_collection("mongoadmin", "items").documents();
    assert_eq!(docs[0].id(), Some(&Value::from(HEX)));
    assert_eq!(docs[0].get("name"), Some(&Value::from("renamed")));
    assert_eq!(docs[0].get("owner"), Some(&Value::ObjectId(oid())));
}

#[test]
fn test_update_missing_document_is_not_found() {
    let (executor, _) = create_test_executor();
    let err = executor
        .execute(Command::UpdateDocument {
            database: None,
            collection: "items".to_string(),
            id: json!({ "$oid": HEX }),
            data: json!({ "name": "x" }),
        })
        .unwrap_err();
    assert!(matches!(err, Error::DocumentNotFound { .. }));
}

#[test]
fn test_update_with_only_id_rejected() {
    let (executor, store) = create_test_executor();
    seed(&store, Value::ObjectId(oid()));
    let err = executor
        .execute(Command::UpdateDocument {
            database: None,
            collection: "items".to_string(),
            id: json!(HEX),
            data: json!({ "_id": HEX }),
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
}

// =============================================================================
// DeleteDocument
// =============================================================================

#[test]
fn test_delete_typed_id_by_hex_string() {
    let (executor, store) = create_test_executor();
    seed(&store, Value::ObjectId(oid()));

    let delete = || {
        executor.execute(Command::DeleteDocument {
            database: None,
            collection: "items".to_string(),
            id: json!(HEX),
        })
    };
    assert_eq!(delete().unwrap(), Output::Deleted { deleted: 1 });
    assert!(store.memory_collection("mongoadmin", "items").is_empty());
    assert!(matches!(delete(), Err(Error::DocumentNotFound { .. })));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_empty_names_are_missing_fields() {
    let (executor, _) = create_test_executor();

    let err = executor
        .execute(Command::ListDocuments {
            database: None,
            collection: String::new(),
            page: None,
        })
        .unwrap_err();
    assert_eq!(
        err,
        Error::MissingField {
            field: "collection".to_string()
        }
    );

    let err = executor
        .execute(Command::ListCollections {
            database: Some(String::new()),
        })
        .unwrap_err();
    assert_eq!(
        err,
        Error::MissingField {
            field: "database".to_string()
        }
    );
}
