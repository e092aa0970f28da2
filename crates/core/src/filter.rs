//! Document filters
//!
//! A deliberately small filter language: the console only ever needs "every
//! document", "field equals value" and "any of these". Equality is type-aware,
//! mirroring a real store: an `ObjectId` condition never matches a hex string
//! stored under the same field, and vice versa.

use serde_json::{json, Value as JsonValue};
use std::fmt;

use crate::document::{Document, ID_FIELD};
use crate::ejson::{self, Mode};
use crate::value::Value;

/// Selection predicate over documents
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document (`{}`)
    All,
    /// `field` holds exactly `value` (same type, same value)
    Eq {
        /// Field name
        field: String,
        /// Expected value
        value: Value,
    },
    /// Any of the inner filters matches (`$or`)
    Or(Vec<Filter>),
}

impl Filter {
    /// Equality on an arbitrary field
    pub fn field_eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Equality on `_id`
    pub fn id(value: impl Into<Value>) -> Self {
        Filter::field_eq(ID_FIELD, value)
    }

    /// Evaluate the filter against a document
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Eq { field, value } => doc.get(field).is_some_and(|v| v.is_identical(value)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
        }
    }

    /// Values of the equality conditions, in order
    pub fn candidates(&self) -> Vec<&Value> {
        match self {
            Filter::All => Vec::new(),
            Filter::Eq { value, .. } => vec![value],
            Filter::Or(filters) => filters.iter().flat_map(Filter::candidates).collect(),
        }
    }

    /// Canonical extended-JSON rendering (`{"_id": {"$oid": ...}}`, `{"$or": [...]}`)
    pub fn to_json(&self) -> JsonValue {
        match self {
            Filter::All => json!({}),
            Filter::Eq { field, value } => {
                let mut obj = serde_json::Map::new();
                obj.insert(field.clone(), ejson::to_json(value, Mode::Canonical));
                JsonValue::Object(obj)
            }
            Filter::Or(filters) => {
                json!({ "$or": filters.iter().map(Filter::to_json).collect::<Vec<_>>() })
            }
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
