//! Acceptance scenarios through the public facade
//!
//! Each test is one concrete situation an admin console runs into after a
//! client mangled typed ids.

use std::sync::Arc;

use docadmin::{
    doc, normalize_payload, repair_collection, resolve_id_query, Console, ConsoleConfig,
    DateTime, Filter, MemoryJournal, MemoryStore, ObjectId, Value,
};
use serde_json::json;

const HEX: &str = "6945cd5054b616d899e8f4e8";
const BYTES: [u8; 12] = [105, 69, 205, 80, 84, 182, 22, 216, 153, 232, 244, 232];

fn oid() -> ObjectId {
    ObjectId::from_bytes(BYTES)
}

#[test]
fn hex_string_finds_typed_and_string_documents() {
    let filter = resolve_id_query(&Value::from(HEX));
    let candidates = filter.candidates();
    assert!(candidates.contains(&&Value::from(HEX)));
    assert!(candidates.contains(&&Value::ObjectId(oid())));

    assert!(filter.matches(&doc! { "_id" => oid() }));
    assert!(filter.matches(&doc! { "_id" => HEX }));
}

#[test]
fn wrapper_object_finds_typed_document() {
    let raw = Value::from_json(&json!({ "$oid": HEX }));
    let filter = resolve_id_query(&raw);
    assert!(filter.matches(&doc! { "_id" => oid() }));
    assert!(filter.matches(&doc! { "_id" => HEX }));
}

#[test]
fn corrupted_buffer_finds_typed_document() {
    let buffer: serde_json::Map<String, serde_json::Value> = BYTES
        .iter()
        .enumerate()
        .map(|(i, b)| (i.to_string(), json!(b)))
        .collect();
    let raw = Value::from_json(&json!({ "buffer": buffer }));

    let filter = resolve_id_query(&raw);
    assert!(matches!(filter, Filter::Or(_)));
    assert!(filter.matches(&doc! { "_id" => oid() }));
    assert!(filter.matches(&doc! { "_id" => HEX }));
}

#[test]
fn normalize_restores_reference_and_date() {
    let input = Value::from_json(&json!({
        "name": "a",
        "ref": HEX,
        "when": { "$date": "2024-01-01T00:00:00Z" }
    }));
    let out = normalize_payload(&input);
    let doc = out.as_document().unwrap();
    assert_eq!(doc.get("name"), Some(&Value::from("a")));
    assert_eq!(doc.get("ref"), Some(&Value::ObjectId(oid())));
    assert_eq!(
        doc.get("when"),
        Some(&Value::DateTime(DateTime::from_millis(1_704_067_200_000)))
    );
}

#[test]
fn repair_counts_three_repaired_one_skipped() {
    let store = MemoryStore::new();
    let col = store.memory_collection("scenarios", "repair");
    for last in ["1", "2", "3"] {
        col.insert_raw(doc! { "_id" => format!("6945cd5054b616d899e8f4e{}", last) });
    }
    col.insert_raw(doc! { "_id" => ObjectId::new() });
    col.insert_raw(doc! { "_id" => ObjectId::new() });
    col.insert_raw(doc! { "_id" => "not hex" });

    let outcome = repair_collection(col.as_ref(), &MemoryJournal::new()).unwrap();
    assert_eq!(outcome.repaired, 3);
    assert_eq!(outcome.skipped(), 1);
    assert_eq!(outcome.already_canonical, 2);
}

#[test]
fn console_update_works_for_either_storage() {
    let store = Arc::new(MemoryStore::new());
    let col = store.memory_collection("mongoadmin", "people");
    col.insert_raw(doc! { "_id" => oid(), "name" => "typed" });
    col.insert_raw(doc! { "_id" => "6945cd5054b616d899e8f4e9", "name" => "string" });

    let console = Console::new(store, ConsoleConfig::default()).unwrap();
    console
        .update_document("mongoadmin", "people", json!(HEX), json!({ "seen": true }))
        .unwrap();
    console
        .update_document(
            "mongoadmin",
            "people",
            json!({ "$oid": "6945cd5054b616d899e8f4e9" }),
            json!({ "seen": true }),
        )
        .unwrap();

    for doc in col.documents() {
        assert_eq!(doc.get("seen"), Some(&Value::Bool(true)));
    }
}
