//! Output enum for command execution results.
//!
//! Every command produces exactly one output variant.

use docadmin_engine::RepairOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::types::{CollectionInfo, DatabaseInfo, DocumentPage};

/// Successful command execution results.
///
/// Each [`Command`](crate::Command) variant maps to exactly one `Output`
/// variant, documented on the command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    // ==================== Documents ====================
    /// One page of a collection
    DocumentPage(DocumentPage),

    /// A single document rendered as extended JSON
    Document(JsonValue),

    /// Insert result
    Inserted {
        /// `_id` of the new document, rendered as extended JSON
        id: JsonValue,
    },

    /// Update result
    Updated {
        /// Documents matched (always 1 on success)
        matched: u64,
        /// Documents changed (0 if every field already had its value)
        modified: u64,
    },

    /// Delete result
    Deleted {
        /// Documents removed (always 1 for a single delete)
        deleted: u64,
    },

    // ==================== Repair ====================
    /// Repair run summary
    Repaired(RepairOutcome),

    // ==================== Collections ====================
    /// Collections of a database
    Collections(Vec<CollectionInfo>),

    /// Drop result
    Dropped {
        /// Collections removed
        dropped: u64,
    },

    // ==================== Databases ====================
    /// Databases of the store
    Databases(Vec<DatabaseInfo>),

    /// Database created
    Created {
        /// Database name
        database: String,
    },
}
