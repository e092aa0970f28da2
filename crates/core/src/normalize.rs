//! Inbound payload normalization
//!
//! Documents edited in a generic JSON editor lose the store's typed values:
//! ids come back as hex strings or `{"$oid": …}` wrappers, timestamps as
//! `{"$date": …}` wrappers. [`normalize_payload`] restores them before the
//! write reaches storage.
//!
//! Rules, checked top-down in this order:
//!
//! 1. `Null` passes through
//! 2. Arrays recurse element-wise
//! 3. Store-native values (`ObjectId`, `DateTime`, `Binary`) pass through untouched
//! 4. `{"$oid": "<hex>"}` becomes an `ObjectId`
//! 5. `{"$date": "<ISO-8601>" | {"$numberLong": "<ms>"} | <ms>}` becomes a `DateTime`;
//!    fractional milliseconds are truncated, as the extended-JSON parser does
//! 6. Any other document: a field holding a 24-hex string becomes an
//!    `ObjectId`, every other field recurses
//! 7. Remaining scalars pass through
//!
//! The hex heuristic only applies to document fields. A bare hex string at the
//! top level or inside an array is left as a string.

use crate::datetime::DateTime;
use crate::document::Document;
use crate::ejson::{DATE_KEY, NUMBER_LONG_KEY, OID_KEY};
use crate::object_id::ObjectId;
use crate::resolve::decode_hex;
use crate::value::Value;

/// Rewrite string/wrapper encoded typed values into native values
///
/// Returns a new value; the input is not modified. Idempotent.
pub fn normalize_payload(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Array(items) => Value::Array(items.iter().map(normalize_payload).collect()),
        native if native.is_canonical_native() => native.clone(),
        Value::Document(doc) => {
            if let Some(oid) = oid_wrapper(doc) {
                return Value::ObjectId(oid);
            }
            if let Some(ts) = date_wrapper(doc) {
                return Value::DateTime(ts);
            }
            Value::Document(normalize_fields(doc))
        }
        scalar => scalar.clone(),
    }
}

/// Normalize every field of a document (rule 6 applied to the top level)
pub fn normalize_document(doc: &Document) -> Document {
    match normalize_payload(&Value::Document(doc.clone())) {
        Value::Document(normalized) => normalized,
        // A top-level wrapper collapsed to a scalar; keep the fields instead
        _ => normalize_fields(doc),
    }
}

fn normalize_fields(doc: &Document) -> Document {
    doc.iter()
        .map(|(key, value)| {
            let normalized = match decode_hex(value) {
                Some(oid) => Value::ObjectId(oid),
                None => normalize_payload(value),
            };
            (key.clone(), normalized)
        })
        .collect()
}

fn single_entry<'a>(doc: &'a Document, key: &str) -> Option<&'a Value> {
    if doc.len() == 1 {
        doc.get(key)
    } else {
        None
    }
}

fn oid_wrapper(doc: &Document) -> Option<ObjectId> {
    decode_hex(single_entry(doc, OID_KEY)?)
}

fn date_wrapper(doc: &Document) -> Option<DateTime> {
    match single_entry(doc, DATE_KEY)? {
        Value::String(s) => DateTime::parse_rfc3339(s),
        Value::Int(ms) => Some(DateTime::from_millis(*ms)),
        Value::Float(ms) => DateTime::from_float_millis(*ms),
        Value::Document(inner) => {
            let ms = single_entry(inner, NUMBER_LONG_KEY)?.as_str()?;
            ms.parse::<i64>().ok().map(DateTime::from_millis)
        }
        _ => None,
    }
}
