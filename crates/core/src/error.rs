//! Error types for docadmin
//!
//! This module defines the error type shared by the core and the storage
//! engine. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Decode failures inside identifier resolution and payload normalization are
//! NOT errors: those paths return `Option` and degrade to exact matching.

use crate::ejson::EjsonError;
use crate::object_id::ObjectIdError;
use std::io;
use thiserror::Error;

/// Result type alias for docadmin operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for docadmin
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (journal files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed typed id where one is strictly required
    #[error("Invalid object id: {0}")]
    InvalidObjectId(#[from] ObjectIdError),

    /// Malformed extended JSON where it is strictly required
    #[error("Invalid extended JSON: {0}")]
    InvalidJson(#[from] EjsonError),

    /// Insert collided with an existing `_id`
    #[error("Duplicate key: {key}")]
    DuplicateKey {
        /// Rendered `_id` value
        key: String,
    },

    /// Storage rejected a write
    #[error("Write error: {0}")]
    WriteError(String),

    /// Another repair run holds the collection
    #[error("Repair already in progress for collection {collection}")]
    RepairInProgress {
        /// Collection name
        collection: String,
    },
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
