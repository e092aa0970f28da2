//! High-level typed wrapper for the Executor.
//!
//! The [`Console`] struct wraps the [`Executor`] and the
//! [`Command`]/[`Output`] enums with one typed method per route operation.
//!
//! # Example
//!
//! ```ignore
//! use docadmin_executor::Console;
//! use docadmin_engine::MemoryStore;
//! use serde_json::json;
//!
//! let console = Console::open(Arc::new(MemoryStore::new()), "/var/lib/docadmin")?;
//!
//! let id = console.insert_document("shop", "orders", json!({"item": "pen"}))?;
//! console.update_document("shop", "orders", id, json!({"qty": 2}))?;
//! ```

use std::path::Path;
use std::sync::Arc;

use docadmin_engine::{RepairOutcome, Store, UpdateResult};
use serde_json::Value as JsonValue;

use crate::config::{ConsoleConfig, CONFIG_FILE_NAME};
use crate::types::{CollectionInfo, DatabaseInfo, DocumentPage};
use crate::{Command, Error, Executor, Output, Result};

fn unexpected(command: &str) -> Error {
    Error::Internal {
        reason: format!("Unexpected output for {}", command),
    }
}

/// High-level typed wrapper for console operations.
///
/// Each method:
///
/// 1. Creates the appropriate [`Command`]
/// 2. Executes it via the [`Executor`]
/// 3. Extracts and returns the typed result
pub struct Console {
    executor: Executor,
}

impl Console {
    /// Create a console over `store` with an explicit configuration.
    pub fn new(store: Arc<dyn Store>, config: ConsoleConfig) -> Result<Self> {
        Ok(Self {
            executor: Executor::new(store, config)?,
        })
    }

    /// Create a console configured from `docadmin.toml` in `dir`.
    ///
    /// A default config file is written if none exists. A relative
    /// `journal_path` is taken relative to `dir`.
    pub fn open<P: AsRef<Path>>(store: Arc<dyn Store>, dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| Error::Io {
            reason: format!("Failed to create '{}': {}", dir.display(), e),
        })?;

        let config_path = dir.join(CONFIG_FILE_NAME);
        ConsoleConfig::write_default_if_missing(&config_path)?;
        let mut config = ConsoleConfig::from_file(&config_path)?;

        if let Some(journal) = &config.repair.journal_path {
            if journal.is_relative() {
                config.repair.journal_path = Some(dir.join(journal));
            }
        }

        tracing::info!(
            target: "docadmin::executor",
            config = %config_path.display(),
            default_database = %config.default_database,
            "Console opened"
        );
        Self::new(store, config)
    }

    /// Get the underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    // =========================================================================
    // Documents (5)
    // =========================================================================

    /// One page of a collection; `page` is 1-based and 0 means the first page.
    pub fn list_documents(
        &self,
        database: &str,
        collection: &str,
        page: u64,
    ) -> Result<DocumentPage> {
        match self.executor.execute(Command::ListDocuments {
            database: Some(database.to_string()),
            collection: collection.to_string(),
            page: Some(page),
        })? {
            Output::DocumentPage(page) => Ok(page),
            _ => Err(unexpected("ListDocuments")),
        }
    }

    /// Fetch a document by id in any representation.
    pub fn find_document(
        &self,
        database: &str,
        collection: &str,
        id: JsonValue,
    ) -> Result<JsonValue> {
        match self.executor.execute(Command::FindDocument {
            database: Some(database.to_string()),
            collection: collection.to_string(),
            id,
        })? {
            Output::Document(doc) => Ok(doc),
            _ => Err(unexpected("FindDocument")),
        }
    }

    /// Insert a document; returns its `_id` as extended JSON.
    pub fn insert_document(
        &self,
        database: &str,
        collection: &str,
        data: JsonValue,
    ) -> Result<JsonValue> {
        match self.executor.execute(Command::InsertDocument {
            database: Some(database.to_string()),
            collection: collection.to_string(),
            data,
        })? {
            Output::Inserted { id } => Ok(id),
            _ => Err(unexpected("InsertDocument")),
        }
    }

    /// Set fields of a document found by id in any representation.
    pub fn update_document(
        &self,
        database: &str,
        collection: &str,
        id: JsonValue,
        data: JsonValue,
    ) -> Result<UpdateResult> {
        match self.executor.execute(Command::UpdateDocument {
            database: Some(database.to_string()),
            collection: collection.to_string(),
            id,
            data,
        })? {
            Output::Updated { matched, modified } => Ok(UpdateResult { matched, modified }),
            _ => Err(unexpected("UpdateDocument")),
        }
    }

    /// Delete a document by id, as received in a query string.
    pub fn delete_document(&self, database: &str, collection: &str, id: &str) -> Result<()> {
        match self.executor.execute(Command::DeleteDocument {
            database: Some(database.to_string()),
            collection: collection.to_string(),
            id: JsonValue::String(id.to_string()),
        })? {
            Output::Deleted { .. } => Ok(()),
            _ => Err(unexpected("DeleteDocument")),
        }
    }

    // =========================================================================
    // Repair (1)
    // =========================================================================

    /// Migrate non-canonical `_id`s in a collection to typed ids.
    pub fn repair_collection(&self, database: &str, collection: &str) -> Result<RepairOutcome> {
        match self.executor.execute(Command::RepairCollection {
            database: Some(database.to_string()),
            collection: collection.to_string(),
        })? {
            Output::Repaired(outcome) => Ok(outcome),
            _ => Err(unexpected("RepairCollection")),
        }
    }

    // =========================================================================
    // Collections (3)
    // =========================================================================

    /// Collections of a database with their document counts and sizes.
    pub fn list_collections(&self, database: &str) -> Result<Vec<CollectionInfo>> {
        match self.executor.execute(Command::ListCollections {
            database: Some(database.to_string()),
        })? {
            Output::Collections(infos) => Ok(infos),
            _ => Err(unexpected("ListCollections")),
        }
    }

    /// Drop a collection; returns false if it did not exist.
    pub fn drop_collection(&self, database: &str, collection: &str) -> Result<bool> {
        match self.executor.execute(Command::DropCollection {
            database: Some(database.to_string()),
            collection: collection.to_string(),
        })? {
            Output::Dropped { dropped } => Ok(dropped > 0),
            _ => Err(unexpected("DropCollection")),
        }
    }

    /// Delete every document of a collection; returns how many were removed.
    pub fn empty_collection(&self, database: &str, collection: &str) -> Result<u64> {
        match self.executor.execute(Command::EmptyCollection {
            database: Some(database.to_string()),
            collection: collection.to_string(),
        })? {
            Output::Deleted { deleted } => Ok(deleted),
            _ => Err(unexpected("EmptyCollection")),
        }
    }

    // =========================================================================
    // Databases (3)
    // =========================================================================

    /// Every database with its collection count and size.
    pub fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        match self.executor.execute(Command::ListDatabases)? {
            Output::Databases(infos) => Ok(infos),
            _ => Err(unexpected("ListDatabases")),
        }
    }

    /// Create a database.
    pub fn create_database(&self, database: &str) -> Result<()> {
        match self.executor.execute(Command::CreateDatabase {
            database: database.to_string(),
        })? {
            Output::Created { .. } => Ok(()),
            _ => Err(unexpected("CreateDatabase")),
        }
    }

    /// Drop a database; returns how many collections were removed.
    pub fn drop_database(&self, database: &str) -> Result<u64> {
        match self.executor.execute(Command::DropDatabase {
            database: database.to_string(),
        })? {
            Output::Dropped { dropped } => Ok(dropped),
            _ => Err(unexpected("DropDatabase")),
        }
    }
}
