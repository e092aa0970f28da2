//! Supporting types for commands and outputs.
//!
//! These types are used in output values. All types are serializable so a
//! route layer can hand them to the browser unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One page of a collection listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    /// Documents rendered as extended JSON, in storage order
    pub data: Vec<JsonValue>,
    /// Documents in the whole collection
    pub total: u64,
    /// 1-based page number
    pub page: u64,
    /// Page size used
    pub limit: u64,
}

impl DocumentPage {
    /// Number of pages needed for `total` documents
    pub fn page_count(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }
}

/// A collection with its document count and data size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name, without the database prefix
    pub name: String,
    /// Documents in the collection
    pub count: u64,
    /// Data size in bytes
    pub size: u64,
}

/// A database with its collection count and total data size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Database name
    pub name: String,
    /// Collections in the database
    pub collections: u64,
    /// Sum of the collections' data sizes, in bytes
    pub size: u64,
    /// True if no collection holds a document
    pub empty: bool,
}
