//! docadmin - identifier resolution, payload normalization and identifier
//! repair for a document-store admin console
//!
//! Clients of a document store do not reliably keep typed ids typed: a
//! browser round-trip turns an `ObjectId` into a hex string, a `{"$oid": …}`
//! object, or a flattened byte buffer. docadmin makes every console operation
//! work regardless, and migrates the stored ids back to the typed form.
//!
//! # Quick Start
//!
//! ```ignore
//! use docadmin::{Console, ConsoleConfig, MemoryStore};
//! use serde_json::json;
//!
//! let console = Console::new(Arc::new(MemoryStore::new()), ConsoleConfig::default())?;
//!
//! let id = console.insert_document("shop", "orders", json!({"item": "pen"}))?;
//! console.delete_document("shop", "orders", id["$oid"].as_str().unwrap())?;
//! ```
//!
//! # Architecture
//!
//! All console operations go through the [`Executor`], which provides a
//! command-based API. The [`Console`] struct provides a typed interface.
//!
//! The three core procedures are also exported directly, for callers with
//! their own request handling:
//!
//! - [`resolve_id_query`]: identifier in any representation to a filter
//! - [`normalize_payload`]: wrapper/hex-encoded values back to typed values
//! - [`repair_collection`]: journaled migration of stored ids

// Re-export the public API from docadmin-executor
pub use docadmin_executor::*;

pub use docadmin_core::{
    doc, ejson, normalize_document, normalize_payload, resolve_id_query, DateTime, Document,
    Filter, ObjectId, Value,
};
pub use docadmin_engine::{
    repair_collection, Collection, FileJournal, MemoryJournal, MemoryStore, RepairJournal, Store,
};
