//! In-memory document store
//!
//! Reference implementation of [`Collection`] and [`Store`]. Matching follows
//! the same exact-type rules as a real store, which is what makes identifier
//! resolution necessary in the first place.
//!
//! ## Thread Safety
//!
//! `MemoryCollection` guards its documents with a `parking_lot::RwLock`;
//! `MemoryStore` keeps collections in a `DashMap` keyed by the
//! `(database, collection)` pair. Both are `Send + Sync`.

use std::sync::Arc;

use dashmap::DashMap;
use docadmin_core::{
    ejson, Document, Error, Filter, ObjectId, Result, Value, ID_FIELD,
};
use parking_lot::RwLock;

use crate::collection::{Collection, DeleteResult, Store, UpdateResult};

/// A collection held entirely in memory
#[derive(Debug)]
pub struct MemoryCollection {
    namespace: String,
    docs: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    /// Create an empty collection
    pub fn new(namespace: impl Into<String>) -> Self {
        MemoryCollection {
            namespace: namespace.into(),
            docs: RwLock::new(Vec::new()),
        }
    }

    /// Store a document verbatim, bypassing `_id` generation and duplicate
    /// checks
    ///
    /// Used to seed collections with ids in whatever representation a buggy
    /// client once wrote.
    pub fn insert_raw(&self, doc: Document) {
        self.docs.write().push(doc);
    }

    /// Snapshot of every document
    pub fn documents(&self) -> Vec<Document> {
        self.docs.read().clone()
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// True if the collection holds no documents
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

impl Collection for MemoryCollection {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn find(&self, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .docs
            .read()
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect())
    }

    fn count(&self, filter: &Filter) -> Result<u64> {
        Ok(self.docs.read().iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    fn insert_one(&self, doc: Document) -> Result<Value> {
        let doc = match doc.id() {
            Some(_) => doc,
            None => {
                // Generated ids go first, like a real store
                let mut with_id = Document::new();
                with_id.insert(ID_FIELD, ObjectId::new());
                with_id.extend(doc);
                with_id
            }
        };
        let id = doc.id().cloned().unwrap_or(Value::Null);

        let mut docs = self.docs.write();
        if docs
            .iter()
            .any(|existing| existing.id().is_some_and(|v| v.is_identical(&id)))
        {
            return Err(Error::DuplicateKey {
                key: ejson::to_string(&id, ejson::Mode::Relaxed),
            });
        }
        docs.push(doc);
        Ok(id)
    }

    fn update_one(&self, filter: &Filter, fields: &Document) -> Result<UpdateResult> {
        let mut docs = self.docs.write();
        let Some(doc) = docs.iter_mut().find(|doc| filter.matches(doc)) else {
            return Ok(UpdateResult::default());
        };

        if let Some(new_id) = fields.id() {
            if !doc.id().is_some_and(|current| current.is_identical(new_id)) {
                return Err(Error::WriteError(format!(
                    "performing an update on the path '{}' would modify the immutable field",
                    ID_FIELD
                )));
            }
        }

        let mut modified = false;
        for (key, value) in fields.iter() {
            if !doc.get(key).is_some_and(|current| current.is_identical(value)) {
                doc.insert(key.clone(), value.clone());
                modified = true;
            }
        }
        Ok(UpdateResult {
            matched: 1,
            modified: u64::from(modified),
        })
    }

    fn delete_one(&self, filter: &Filter) -> Result<DeleteResult> {
        let mut docs = self.docs.write();
        match docs.iter().position(|doc| filter.matches(doc)) {
            Some(pos) => {
                docs.remove(pos);
                Ok(DeleteResult { deleted: 1 })
            }
            None => Ok(DeleteResult { deleted: 0 }),
        }
    }

    fn delete_many(&self, filter: &Filter) -> Result<DeleteResult> {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|doc| !filter.matches(doc));
        Ok(DeleteResult {
            deleted: (before - docs.len()) as u64,
        })
    }
}

/// A store of in-memory collections
///
/// Collections are keyed by the `(database, collection)` pair, so
/// `("a.b", "c")` and `("a", "b.c")` stay apart even though both render as
/// the namespace `a.b.c`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<(String, String), Arc<MemoryCollection>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Concrete handle to a collection, created on first use
    pub fn memory_collection(&self, database: &str, collection: &str) -> Arc<MemoryCollection> {
        self.collections
            .entry((database.to_string(), collection.to_string()))
            .or_insert_with(|| {
                Arc::new(MemoryCollection::new(format!("{}.{}", database, collection)))
            })
            .clone()
    }
}

impl Store for MemoryStore {
    fn collection(&self, database: &str, collection: &str) -> Arc<dyn Collection> {
        self.memory_collection(database, collection)
    }

    fn collection_names(&self, database: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .filter(|entry| entry.key().0 == database)
            .map(|entry| entry.key().1.clone())
            .collect();
        names.sort();
        names
    }

    fn database_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .map(|entry| entry.key().0.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn drop_collection(&self, database: &str, collection: &str) -> bool {
        let dropped = self
            .collections
            .remove(&(database.to_string(), collection.to_string()))
            .is_some();
        if dropped {
            tracing::debug!(
                target: "docadmin::store",
                database,
                collection,
                "Dropped collection"
            );
        }
        dropped
    }

    fn drop_database(&self, database: &str) -> u64 {
        let before = self.collections.len();
        self.collections.retain(|key, _| key.0 != database);
        let dropped = (before - self.collections.len()) as u64;
        tracing::debug!(target: "docadmin::store", database, dropped, "Dropped database");
        dropped
    }
}
