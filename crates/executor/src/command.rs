//! Command enum defining every console operation.
//!
//! Commands are what the route layer builds from a request. They are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Request bodies deserialize straight into them
//! - **Untyped at the edge**: Ids and payloads stay plain JSON until a
//!   handler resolves or normalizes them

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A command is a self-contained, serializable operation.
///
/// # Command Categories
///
/// | Category | Count | Description |
/// |----------|-------|-------------|
/// | Documents | 5 | List, find, insert, update, delete |
/// | Repair | 1 | Identifier repair |
/// | Collections | 3 | List, drop, empty |
/// | Databases | 3 | List, create, drop |
///
/// # Database field
///
/// Document, repair and collection commands have an optional `database`
/// field. When omitted (or `None`), the executor uses `default_database` from
/// the configuration. `CreateDatabase` and `DropDatabase` require it.
///
/// # Example
///
/// ```ignore
/// use docadmin_executor::Command;
/// use serde_json::json;
///
/// let cmd = Command::UpdateDocument {
///     database: None,
///     collection: "orders".into(),
///     id: json!({"$oid": "6945cd5054b616d899e8f4e8"}),
///     data: json!({"status": "shipped"}),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    // ==================== Documents (5) ====================
    /// List one page of a collection.
    /// Returns: `Output::DocumentPage`
    ListDocuments {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Collection name
        collection: String,
        /// 1-based page; missing or 0 means the first page
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page: Option<u64>,
    },

    /// Fetch one document by id, in any representation.
    /// Returns: `Output::Document`
    FindDocument {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Collection name
        collection: String,
        /// Identifier as the client has it
        id: JsonValue,
    },

    /// Insert a document after normalization.
    /// Returns: `Output::Inserted`
    InsertDocument {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Collection name
        collection: String,
        /// Document body; must be an object
        data: JsonValue,
    },

    /// Set fields of one document, found by id in any representation.
    /// Returns: `Output::Updated`
    UpdateDocument {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Collection name
        collection: String,
        /// Identifier as the client has it
        id: JsonValue,
        /// Fields to set; `_id` is ignored
        data: JsonValue,
    },

    /// Delete one document, found by id in any representation.
    /// Returns: `Output::Deleted`
    DeleteDocument {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Collection name
        collection: String,
        /// Identifier as the client has it
        id: JsonValue,
    },

    // ==================== Repair (1) ====================
    /// Migrate non-canonical `_id`s in a collection to typed ids.
    /// Returns: `Output::Repaired`
    RepairCollection {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Collection name
        collection: String,
    },

    // ==================== Collections (3) ====================
    /// List collections with their document counts and sizes.
    /// Returns: `Output::Collections`
    ListCollections {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
    },

    /// Remove a collection and its documents.
    /// Returns: `Output::Dropped`
    DropCollection {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Collection name
        collection: String,
    },

    /// Delete every document of a collection, keeping the collection.
    /// Returns: `Output::Deleted`
    EmptyCollection {
        /// Database name
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
        /// Collection name
        collection: String,
    },

    // ==================== Databases (3) ====================
    /// List databases with their sizes.
    /// Returns: `Output::Databases`
    ListDatabases,

    /// Create a database by writing its metadata collection.
    /// Returns: `Output::Created`
    CreateDatabase {
        /// Database name
        database: String,
    },

    /// Remove a database and every collection in it.
    /// Returns: `Output::Dropped`
    DropDatabase {
        /// Database name
        database: String,
    },
}

impl Command {
    /// Name of the command, for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::ListDocuments { .. } => "ListDocuments",
            Command::FindDocument { .. } => "FindDocument",
            Command::InsertDocument { .. } => "InsertDocument",
            Command::UpdateDocument { .. } => "UpdateDocument",
            Command::DeleteDocument { .. } => "DeleteDocument",
            Command::RepairCollection { .. } => "RepairCollection",
            Command::ListCollections { .. } => "ListCollections",
            Command::DropCollection { .. } => "DropCollection",
            Command::EmptyCollection { .. } => "EmptyCollection",
            Command::ListDatabases => "ListDatabases",
            Command::CreateDatabase { .. } => "CreateDatabase",
            Command::DropDatabase { .. } => "DropDatabase",
        }
    }

    /// True if the command writes to the store
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Command::InsertDocument { .. }
                | Command::UpdateDocument { .. }
                | Command::DeleteDocument { .. }
                | Command::RepairCollection { .. }
                | Command::DropCollection { .. }
                | Command::EmptyCollection { .. }
                | Command::CreateDatabase { .. }
                | Command::DropDatabase { .. }
        )
    }
}
