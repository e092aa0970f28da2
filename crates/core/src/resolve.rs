//! Identifier resolution
//!
//! Maps an identifier received from an untrusted client back to a filter that
//! matches the document however its `_id` was actually stored.
//!
//! ## Accepted shapes
//!
//! | Shape | Example | Classified as |
//! |-------|---------|---------------|
//! | Typed id | `ObjectId(6945…)` | [`RawId::Native`] |
//! | Hex string | `"6945cd5054b616d899e8f4e8"` | [`RawId::Hex`] |
//! | Wrapper object | `{"$oid": "6945…"}` | [`RawId::Wrapper`] |
//! | Flattened byte buffer | `{"buffer": {"0": 105, …, "11": 232}}` | [`RawId::CorruptBuffer`] |
//! | Serialized form of any of the above | `"{\"$oid\":\"6945…\"}"` | parsed first, then classified |
//!
//! Anything else is [`RawId::Opaque`] and only matches by exact value.
//!
//! ## Candidate order
//!
//! 1. The raw input, unchanged
//! 2. The parsed form of a serialized input
//! 3. The typed id and/or its hex string, depending on the shape
//!
//! Candidates are de-duplicated by type and value, so `ObjectId(x)` and `"x"`
//! are both kept.

use crate::document::Document;
use crate::ejson;
use crate::filter::Filter;
use crate::object_id::{ObjectId, OBJECT_ID_LEN};
use crate::value::Value;

/// Field holding the flattened byte array of a corrupted id
pub const BUFFER_FIELD: &str = "buffer";

/// Closed classification of a client-supplied identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawId {
    /// Already the store-native typed id
    Native(ObjectId),
    /// Plain 24-character hex string
    Hex(ObjectId),
    /// `{"$oid": "<hex>"}` wrapper object
    Wrapper(ObjectId),
    /// `{"buffer": {"0": b0, …, "11": b11}}` flattened byte array
    CorruptBuffer(ObjectId),
    /// Nothing decodable; matched only by exact value
    Opaque,
}

impl RawId {
    /// Classify a value
    ///
    /// Decoders are tried in a fixed order and the first success wins.
    pub fn classify(value: &Value) -> RawId {
        if let Some(oid) = value.as_object_id() {
            return RawId::Native(oid);
        }
        if let Some(oid) = decode_hex(value) {
            return RawId::Hex(oid);
        }
        if let Some(oid) = decode_wrapper(value) {
            return RawId::Wrapper(oid);
        }
        if let Some(bytes) = decode_buffer(value) {
            return RawId::CorruptBuffer(ObjectId::from_bytes(bytes));
        }
        RawId::Opaque
    }

    /// The typed id this identifier denotes, if any
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            RawId::Native(oid) | RawId::Hex(oid) | RawId::Wrapper(oid) | RawId::CorruptBuffer(oid) => {
                Some(*oid)
            }
            RawId::Opaque => None,
        }
    }

    /// True if the value is already in canonical typed form
    pub fn is_native(&self) -> bool {
        matches!(self, RawId::Native(_))
    }
}

// =============================================================================
// Decoders: each returns None instead of failing
// =============================================================================

/// A plain 24-character hex string
pub fn decode_hex(value: &Value) -> Option<ObjectId> {
    let s = value.as_str()?;
    if !ObjectId::is_valid_hex(s) {
        return None;
    }
    ObjectId::parse_str(s).ok()
}

/// A document carrying a hex string under `$oid`
pub fn decode_wrapper(value: &Value) -> Option<ObjectId> {
    let doc = value.as_document()?;
    decode_hex(doc.get(ejson::OID_KEY)?)
}

/// A document whose `buffer` field is the flattened 12-byte array of a typed id
///
/// Only entries with a numeric key and an integral value in 0..=255 are kept,
/// ordered by key. The buffer decodes only if exactly 12 entries survive. A
/// `buffer` given as an array or as raw binary is accepted the same way.
pub fn decode_buffer(value: &Value) -> Option<[u8; OBJECT_ID_LEN]> {
    let buffer = value.as_document()?.get(BUFFER_FIELD)?;
    let bytes: Vec<u8> = match buffer {
        Value::Document(entries) => indexed_bytes(entries),
        Value::Array(items) => items.iter().filter_map(byte_value).collect(),
        Value::Binary(raw) => raw.clone(),
        _ => return None,
    };
    bytes.try_into().ok()
}

fn indexed_bytes(entries: &Document) -> Vec<u8> {
    let mut indexed: Vec<(u64, u8)> = entries
        .iter()
        .filter_map(|(k, v)| Some((k.parse::<u64>().ok()?, byte_value(v)?)))
        .collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, b)| b).collect()
}

fn byte_value(value: &Value) -> Option<u8> {
    match value {
        Value::Int(i) => u8::try_from(*i).ok(),
        Value::Float(f) if f.fract() == 0.0 && (0.0..=255.0).contains(f) => Some(*f as u8),
        _ => None,
    }
}

/// Parse a string that looks like serialized structure (`{…}` or `[…]`)
///
/// Extended JSON first so wrappers decode to native values; plain JSON if
/// that fails. Returns None for strings that do not look structured or do not
/// parse at all.
pub fn parse_structured(value: &Value) -> Option<Value> {
    let s = value.as_str()?;
    let trimmed = s.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    match ejson::parse(trimmed) {
        Ok(parsed) => Some(parsed),
        Err(_) => serde_json::from_str::<serde_json::Value>(trimmed)
            .ok()
            .map(|json| Value::from_json(&json)),
    }
}

// =============================================================================
// Candidate generation
// =============================================================================

/// Ordered, de-duplicated candidate values for a raw identifier
pub fn id_candidates(raw: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    push_unique(&mut candidates, raw.clone());

    let parsed = parse_structured(raw);
    if let Some(parsed) = &parsed {
        push_unique(&mut candidates, parsed.clone());
    }
    let target = parsed.as_ref().unwrap_or(raw);

    match RawId::classify(target) {
        RawId::Hex(oid) => push_unique(&mut candidates, Value::ObjectId(oid)),
        RawId::Native(oid) | RawId::Wrapper(oid) | RawId::CorruptBuffer(oid) => {
            push_unique(&mut candidates, Value::ObjectId(oid));
            push_unique(&mut candidates, Value::String(oid.to_hex()));
        }
        RawId::Opaque => {}
    }
    candidates
}

fn push_unique(candidates: &mut Vec<Value>, value: Value) {
    if !candidates.iter().any(|c| c.is_identical(&value)) {
        candidates.push(value);
    }
}

/// Build the `_id` filter for a raw client identifier
///
/// One candidate yields a plain equality, several yield an `$or` in
/// generation order. Never fails: undecodable input degrades to an exact
/// match on the raw value.
pub fn resolve_id_query(raw: &Value) -> Filter {
    let mut candidates = id_candidates(raw);
    let filter = match candidates.len() {
        0 => Filter::id(raw.clone()),
        1 => Filter::id(candidates.remove(0)),
        _ => Filter::Or(candidates.into_iter().map(Filter::id).collect()),
    };
    tracing::debug!(target: "docadmin::resolve", filter = %filter, "resolved id query");
    filter
}
