//! Error types for console commands.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be sent to the browser as JSON
//! - **Distinct**: A missing document is never reported as a failed write

use serde::{Deserialize, Serialize};

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants | Route status |
/// |----------|----------|--------------|
/// | Not Found | `DocumentNotFound` | 404 |
/// | Validation | `MissingField`, `InvalidInput` | 400 |
/// | Write | `WriteFailed` | 500 |
/// | Concurrency | `RepairInProgress` | 409 |
/// | System | `Io`, `Serialization`, `Internal` | 500 |
///
/// # Example
///
/// ```ignore
/// use docadmin_executor::{Console, Error};
///
/// match console.delete_document("shop", "orders", id) {
///     Ok(()) => { /* deleted */ }
///     Err(Error::DocumentNotFound { id }) => {
///         println!("No document with id {}", id);
///     }
///     Err(e) => {
///         println!("Error: {}", e);
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// No document matched any representation of the id
    #[error("document not found: {id}")]
    DocumentNotFound {
        /// Identifier as received, rendered as extended JSON
        id: String,
    },

    // ==================== Validation Errors ====================
    /// A required request field was absent or empty
    #[error("missing required field: {field}")]
    MissingField {
        /// Field name
        field: String,
    },

    /// Invalid input
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong
        reason: String,
    },

    // ==================== Write Errors ====================
    /// The store rejected a write
    #[error("write failed: {reason}")]
    WriteFailed {
        /// Store error
        reason: String,
    },

    // ==================== Concurrency Errors ====================
    /// Another repair run holds the collection
    #[error("repair already in progress: {collection}")]
    RepairInProgress {
        /// Collection namespace
        collection: String,
    },

    // ==================== System Errors ====================
    /// I/O error
    #[error("I/O error: {reason}")]
    Io {
        /// Underlying error
        reason: String,
    },

    /// Serialization error
    #[error("serialization error: {reason}")]
    Serialization {
        /// Underlying error
        reason: String,
    },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal {
        /// Underlying error
        reason: String,
    },
}

impl Error {
    /// HTTP status a route layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Error::DocumentNotFound { .. } => 404,
            Error::MissingField { .. } | Error::InvalidInput { .. } => 400,
            Error::RepairInProgress { .. } => 409,
            Error::WriteFailed { .. }
            | Error::Io { .. }
            | Error::Serialization { .. }
            | Error::Internal { .. } => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_a_write_failure() {
        let not_found = Error::DocumentNotFound {
            id: "\"abc\"".to_string(),
        };
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(
            Error::WriteFailed {
                reason: "x".to_string()
            }
            .status_code(),
            500
        );
    }

    #[test]
    fn test_display() {
        let err = Error::MissingField {
            field: "data".to_string(),
        };
        assert_eq!(err.to_string(), "missing required field: data");
    }

    #[test]
    fn test_serializes_with_variant_tag() {
        let err = Error::RepairInProgress {
            collection: "shop.orders".to_string(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["RepairInProgress"]["collection"], "shop.orders");

        let back: Error = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }
}
