//! Storage collaborator capability
//!
//! The console never talks to a driver directly. Everything it needs from the
//! document store is expressed by [`Collection`] and [`Store`]: find by
//! filter, single-document update/delete/insert, bulk delete, and database
//! and collection discovery and removal.
//!
//! ## Contract
//!
//! - Single-document operations affect at most one document and report a
//!   count, never partial results.
//! - Filter matching is type-aware: an `ObjectId` condition never matches a
//!   string `_id` (see [`docadmin_core::Filter::matches`]).
//! - `insert_one` rejects a duplicate `_id` with [`Error::DuplicateKey`].
//!
//! [`Error::DuplicateKey`]: docadmin_core::Error::DuplicateKey

use std::sync::Arc;

use docadmin_core::ejson::{self, Mode};
use docadmin_core::{Document, Filter, Result, Value};
use serde::{Deserialize, Serialize};

/// Outcome of `update_one`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    /// Documents matched by the filter (0 or 1)
    pub matched: u64,
    /// Documents actually changed (0 or 1)
    pub modified: u64,
}

/// Outcome of `delete_one` and `delete_many`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    /// Documents removed
    pub deleted: u64,
}

/// A single collection in the document store
pub trait Collection: Send + Sync {
    /// Fully qualified name (`database.collection`), unique per store
    fn namespace(&self) -> &str;

    /// All documents matching `filter`, in storage order
    fn find(&self, filter: &Filter) -> Result<Vec<Document>>;

    /// One page of matching documents
    fn find_page(&self, filter: &Filter, skip: usize, limit: usize) -> Result<Vec<Document>> {
        Ok(self
            .find(filter)?
            .into_iter()
            .skip(skip)
            .take(limit)
            .collect())
    }

    /// First matching document
    fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        Ok(self.find(filter)?.into_iter().next())
    }

    /// Number of matching documents
    fn count(&self, filter: &Filter) -> Result<u64> {
        Ok(self.find(filter)?.len() as u64)
    }

    /// Insert a document, generating an `ObjectId` `_id` when absent
    ///
    /// Returns the `_id` of the inserted document.
    fn insert_one(&self, doc: Document) -> Result<Value>;

    /// Apply a `$set` of `fields` to the first matching document
    fn update_one(&self, filter: &Filter, fields: &Document) -> Result<UpdateResult>;

    /// Remove the first matching document
    fn delete_one(&self, filter: &Filter) -> Result<DeleteResult>;

    /// Remove every matching document
    fn delete_many(&self, filter: &Filter) -> Result<DeleteResult> {
        let mut deleted = 0;
        while self.delete_one(filter)?.deleted > 0 {
            deleted += 1;
        }
        Ok(DeleteResult { deleted })
    }

    /// Approximate data size in bytes: the canonical extended-JSON length of
    /// every document
    fn data_size(&self) -> Result<u64> {
        Ok(self
            .find(&Filter::All)?
            .iter()
            .map(|doc| ejson::document_to_json(doc, Mode::Canonical).to_string().len() as u64)
            .sum())
    }
}

/// A document store holding named databases of collections
pub trait Store: Send + Sync {
    /// Handle to a collection; collections spring into existence on first use
    fn collection(&self, database: &str, collection: &str) -> Arc<dyn Collection>;

    /// Names of the collections in a database, sorted
    fn collection_names(&self, database: &str) -> Vec<String>;

    /// Names of every database holding at least one collection, sorted
    fn database_names(&self) -> Vec<String>;

    /// Remove a collection and its documents; false if it did not exist
    fn drop_collection(&self, database: &str, collection: &str) -> bool;

    /// Remove every collection of a database; returns how many were removed
    fn drop_database(&self, database: &str) -> u64;
}
