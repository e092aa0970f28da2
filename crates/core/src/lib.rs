//! Core types and algorithms for docadmin
//!
//! This crate defines the value model of the document store and the three
//! identifier/payload algorithms the console is built around:
//! - ObjectId: 12-byte typed document identifier
//! - DateTime: Millisecond timestamp
//! - Value / Document: Store-native values and insertion-ordered documents
//! - ejson: Extended JSON wrapper encoding (`$oid`, `$date`, …)
//! - Filter: Type-aware selection predicates
//! - resolve: Client identifier → `_id` filter over every plausible representation
//! - normalize: Inbound payload → store-native typed values
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod datetime;
pub mod document;
pub mod ejson;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod object_id;
pub mod resolve;
pub mod value;

pub use datetime::DateTime;
pub use document::{Document, ID_FIELD};
pub use error::{Error, Result};
pub use filter::Filter;
pub use normalize::{normalize_document, normalize_payload};
pub use object_id::{ObjectId, ObjectIdError, OBJECT_ID_HEX_LEN, OBJECT_ID_LEN};
pub use resolve::{id_candidates, resolve_id_query, RawId};
pub use value::{Value, ValueType};
