//! Tests for the collection and database admin commands.

use docadmin_core::{doc, Value};
use docadmin_engine::{RepairGuard, Store};
use serde_json::json;

use super::create_test_executor;
use crate::handlers::databases::ADMIN_METADATA_COLLECTION;
use crate::{Command, DatabaseInfo, Error, Output};

fn drop_collection(database: &str, collection: &str) -> Command {
    Command::DropCollection {
        database: Some(database.to_string()),
        collection: collection.to_string(),
    }
}

// =============================================================================
// Database names
// =============================================================================

#[test]
fn test_dotted_database_rejected_before_touching_store() {
    let (executor, store) = create_test_executor();

    let err = executor
        .execute(Command::InsertDocument {
            database: Some("shop.eu".to_string()),
            collection: "orders".to_string(),
            data: json!({ "n": 1 }),
        })
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput { .. }));
    assert_eq!(err.status_code(), 400);
    assert!(store.database_names().is_empty());
}

#[test]
fn test_dotted_collection_stays_in_its_database() {
    let (executor, store) = create_test_executor();
    executor
        .execute(Command::InsertDocument {
            database: Some("shop".to_string()),
            collection: "eu.orders".to_string(),
            data: json!({ "n": 1 }),
        })
        .unwrap();

    assert_eq!(store.collection_names("shop"), vec!["eu.orders"]);
    assert!(store.collection_names("shop.eu").is_empty());
    assert!(matches!(
        executor.execute(Command::ListCollections {
            database: Some("shop.eu".to_string())
        }),
        Err(Error::InvalidInput { .. })
    ));
}

// =============================================================================
// Collections
// =============================================================================

#[test]
fn test_list_collections_reports_size() {
    let (executor, store) = create_test_executor();
    let col = store.memory_collection("shop", "orders");
    col.insert_raw(doc! { "_id" => 1i64 });

    match executor
        .execute(Command::ListCollections {
            database: Some("shop".to_string()),
        })
        .unwrap()
    {
        Output::Collections(infos) => {
            assert_eq!(infos.len(), 1);
            assert_eq!(infos[0].count, 1);
            // {"_id":{"$numberLong":"1"}}
            assert_eq!(infos[0].size, 28);
        }
        other => panic!("Expected Collections, got {:?}", other),
    }
}

#[test]
fn test_drop_collection() {
    let (executor, store) = create_test_executor();
    store
        .memory_collection("shop", "orders")
        .insert_raw(doc! { "_id" => "a" });
    store.memory_collection("shop", "customers");

    assert_eq!(
        executor.execute(drop_collection("shop", "orders")).unwrap(),
        Output::Dropped { dropped: 1 }
    );
    assert_eq!(store.collection_names("shop"), vec!["customers"]);

    // Dropping again is a no-op
    assert_eq!(
        executor.execute(drop_collection("shop", "orders")).unwrap(),
        Output::Dropped { dropped: 0 }
    );
    assert_eq!(store.collection_names("shop"), vec!["customers"]);
}

#[test]
fn test_empty_collection_keeps_collection() {
    let (executor, store) = create_test_executor();
    let col = store.memory_collection("shop", "orders");
    for i in 0..4i64 {
        col.insert_raw(doc! { "_id" => i });
    }

    let out = executor
        .execute(Command::EmptyCollection {
            database: Some("shop".to_string()),
            collection: "orders".to_string(),
        })
        .unwrap();
    assert_eq!(out, Output::Deleted { deleted: 4 });
    assert!(col.is_empty());
    assert_eq!(store.collection_names("shop"), vec!["orders"]);
}

#[test]
fn test_drop_and_empty_wait_for_repair() {
    let (executor, store) = create_test_executor();
    let col = store.memory_collection("admin_tests", "busy");
    col.insert_raw(doc! { "_id" => "a" });
    let held = RepairGuard::acquire("admin_tests.busy").unwrap();

    assert!(matches!(
        executor.execute(drop_collection("admin_tests", "busy")),
        Err(Error::RepairInProgress { .. })
    ));
    assert!(matches!(
        executor.execute(Command::EmptyCollection {
            database: Some("admin_tests".to_string()),
            collection: "busy".to_string(),
        }),
        Err(Error::RepairInProgress { .. })
    ));
    assert!(matches!(
        executor.execute(Command::DropDatabase {
            database: "admin_tests".to_string(),
        }),
        Err(Error::RepairInProgress { .. })
    ));
    assert_eq!(col.len(), 1);

    drop(held);
    assert_eq!(
        executor.execute(drop_collection("admin_tests", "busy")).unwrap(),
        Output::Dropped { dropped: 1 }
    );
}

// =============================================================================
// Databases
// =============================================================================

#[test]
fn test_create_list_drop_database() {
    let (executor, store) = create_test_executor();

    assert_eq!(
        executor
            .execute(Command::CreateDatabase {
                database: "fresh".to_string(),
            })
            .unwrap(),
        Output::Created {
            database: "fresh".to_string()
        }
    );
    let meta = store.memory_collection("fresh", ADMIN_METADATA_COLLECTION);
    assert!(matches!(
        meta.documents()[0].get("created_at"),
        Some(Value::DateTime(_))
    ));

    store.memory_collection("idle", "nothing");
    match executor.execute(Command::ListDatabases).unwrap() {
        Output::Databases(infos) => {
            assert_eq!(infos.len(), 2);
            assert_eq!(infos[0].name, "fresh");
            assert_eq!(infos[0].collections, 1);
            assert!(infos[0].size > 0);
            assert!(!infos[0].empty);
            assert_eq!(
                infos[1],
                DatabaseInfo {
                    name: "idle".to_string(),
                    collections: 1,
                    size: 0,
                    empty: true,
                }
            );
        }
        other => panic!("Expected Databases, got {:?}", other),
    }

    assert_eq!(
        executor
            .execute(Command::DropDatabase {
                database: "fresh".to_string(),
            })
            .unwrap(),
        Output::Dropped { dropped: 1 }
    );
    assert_eq!(store.database_names(), vec!["idle"]);
}

#[test]
fn test_create_database_rejects_bad_names() {
    let (executor, store) = create_test_executor();
    for (name, missing) in [("", true), ("a.b", false), ("a b", false), ("$x", false)] {
        let err = executor
            .execute(Command::CreateDatabase {
                database: name.to_string(),
            })
            .unwrap_err();
        assert_eq!(matches!(err, Error::MissingField { .. }), missing, "{:?}", name);
    }
    assert!(store.database_names().is_empty());
}
