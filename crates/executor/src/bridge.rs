//! Bridge module: store access and request conversion for handlers.
//!
//! It provides:
//!
//! - [`Context`]: the store, the repair journal and the rendering settings
//!   every handler needs
//! - Validation helpers: database, collection, id and payload checks
//! - Conversion helpers: plain JSON to [`Value`]/[`Document`] and back out as
//!   extended JSON

use std::sync::Arc;

use docadmin_core::ejson::{self, Mode};
use docadmin_core::{Document, Value};
use docadmin_engine::{Collection, RepairJournal, Store};
use serde_json::Value as JsonValue;

use crate::{Error, Result};

// =============================================================================
// Context
// =============================================================================

/// Everything a handler may touch
#[derive(Clone)]
pub struct Context {
    /// The document store
    pub store: Arc<dyn Store>,
    /// Journal for repair runs
    pub journal: Arc<dyn RepairJournal>,
    /// Database used when a command names none
    pub default_database: String,
    /// Documents per listing page
    pub page_size: usize,
    /// Extended JSON flavour for rendered documents
    pub mode: Mode,
}

impl Context {
    /// Collection handle for a command's `database` / `collection` pair
    pub fn collection(
        &self,
        database: Option<&str>,
        collection: &str,
    ) -> Result<Arc<dyn Collection>> {
        let database = self.database(database)?;
        validate_collection(collection)?;
        Ok(self.store.collection(database, collection))
    }

    /// Database a command targets, validated
    pub fn database<'a>(&'a self, database: Option<&'a str>) -> Result<&'a str> {
        let name = database.unwrap_or(&self.default_database);
        validate_database(name)?;
        Ok(name)
    }

    /// Render a document in the configured mode
    pub fn render(&self, doc: &Document) -> JsonValue {
        ejson::document_to_json(doc, self.mode)
    }

    /// Render a value in the configured mode
    pub fn render_value(&self, value: &Value) -> JsonValue {
        ejson::to_json(value, self.mode)
    }
}

// =============================================================================
// Validation
// =============================================================================

fn missing(field: &str) -> Error {
    Error::MissingField {
        field: field.to_string(),
    }
}

/// Longest database name the store accepts, in bytes
pub const MAX_DATABASE_NAME_LEN: usize = 64;

// Characters the store forbids in database names
const FORBIDDEN_DATABASE_CHARS: [char; 7] = ['/', '\\', '.', ' ', '"', '$', '\0'];

/// Reject an empty database name or one the store cannot address.
///
/// A `.` would also make `database.collection` namespaces ambiguous.
pub fn validate_database(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(missing("database"));
    }
    if name.len() > MAX_DATABASE_NAME_LEN {
        return Err(Error::InvalidInput {
            reason: format!(
                "database name must be at most {} bytes",
                MAX_DATABASE_NAME_LEN
            ),
        });
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_DATABASE_CHARS.contains(c)) {
        return Err(Error::InvalidInput {
            reason: format!("database name '{}' must not contain {:?}", name, c),
        });
    }
    Ok(())
}

/// Reject an empty collection name or one the store cannot address.
pub fn validate_collection(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(missing("collection"));
    }
    if name.contains('\0') {
        return Err(Error::InvalidInput {
            reason: "collection name must not contain NUL bytes".to_string(),
        });
    }
    if name.starts_with("system.") {
        return Err(Error::InvalidInput {
            reason: format!("collection '{}' is reserved", name),
        });
    }
    Ok(())
}

/// Convert a request identifier, rejecting absent ones.
///
/// The id stays in its plain JSON shape: a `{"$oid": …}` object becomes a
/// document, a string stays a string. Identifier resolution decides what it
/// denotes.
pub fn id_from_json(id: &JsonValue) -> Result<Value> {
    match id {
        JsonValue::Null => Err(missing("id")),
        JsonValue::String(s) if s.is_empty() => Err(missing("id")),
        other => Ok(Value::from_json(other)),
    }
}

/// Convert a request body into a document.
pub fn document_from_json(data: &JsonValue) -> Result<Document> {
    match Value::from_json(data) {
        Value::Null => Err(missing("data")),
        Value::Document(doc) => Ok(doc),
        other => Err(Error::InvalidInput {
            reason: format!("data must be an object, got {}", other.type_tag()),
        }),
    }
}
