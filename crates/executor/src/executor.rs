//! The Executor - single entry point to the document store.
//!
//! The Executor is a stateless dispatcher that routes commands to their
//! handlers and converts results to outputs.

use std::sync::Arc;

use docadmin_engine::{FileJournal, MemoryJournal, RepairJournal, Store};

use crate::bridge::Context;
use crate::config::ConsoleConfig;
use crate::convert::convert_result;
use crate::handlers::{collections, databases, documents, repair};
use crate::{Command, Output, Result};

/// The command executor - single entry point to the document store.
///
/// The Executor holds the store, the repair journal and the rendering
/// settings, and no per-request state.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use docadmin_executor::{Command, ConsoleConfig, Executor};
/// use docadmin_engine::MemoryStore;
///
/// let executor = Executor::new(Arc::new(MemoryStore::new()), ConsoleConfig::default())?;
///
/// let result = executor.execute(Command::ListCollections { database: None })?;
/// ```
pub struct Executor {
    ctx: Context,
    config: ConsoleConfig,
}

impl Executor {
    /// Create an executor over `store`.
    ///
    /// The repair journal is the file named by `[repair] journal_path`, or an
    /// in-memory journal when unset.
    pub fn new(store: Arc<dyn Store>, config: ConsoleConfig) -> Result<Self> {
        let journal: Arc<dyn RepairJournal> = match &config.repair.journal_path {
            Some(path) => Arc::new(convert_result(FileJournal::open(path))?),
            None => Arc::new(MemoryJournal::new()),
        };
        Self::with_journal(store, config, journal)
    }

    /// Create an executor with an explicit repair journal.
    pub fn with_journal(
        store: Arc<dyn Store>,
        config: ConsoleConfig,
        journal: Arc<dyn RepairJournal>,
    ) -> Result<Self> {
        config.validate()?;
        let ctx = Context {
            store,
            journal,
            default_database: config.default_database.clone(),
            page_size: config.page_size,
            mode: config.output_mode()?,
        };
        Ok(Self { ctx, config })
    }

    /// Execute a single command.
    ///
    /// Returns the command result or an error.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        let name = cmd.name();
        tracing::debug!(target: "docadmin::executor", command = name, "Executing command");

        let result = self.dispatch(cmd);
        if let Err(e) = &result {
            tracing::debug!(
                target: "docadmin::executor",
                command = name,
                error = %e,
                "Command failed"
            );
        }
        result
    }

    fn dispatch(&self, cmd: Command) -> Result<Output> {
        let ctx = &self.ctx;
        match cmd {
            // Document commands
            Command::ListDocuments {
                database,
                collection,
                page,
            } => documents::list_documents(ctx, database, collection, page),
            Command::FindDocument {
                database,
                collection,
                id,
            } => documents::find_document(ctx, database, collection, id),
            Command::InsertDocument {
                database,
                collection,
                data,
            } => documents::insert_document(ctx, database, collection, data),
            Command::UpdateDocument {
                database,
                collection,
                id,
                data,
            } => documents::update_document(ctx, database, collection, id, data),
            Command::DeleteDocument {
                database,
                collection,
                id,
            } => documents::delete_document(ctx, database, collection, id),

            // Repair commands
            Command::RepairCollection {
                database,
                collection,
            } => repair::repair_collection(ctx, database, collection),

            // Collection commands
            Command::ListCollections { database } => {
                collections::list_collections(ctx, database)
            }
            Command::DropCollection {
                database,
                collection,
            } => collections::drop_collection(ctx, database, collection),
            Command::EmptyCollection {
                database,
                collection,
            } => collections::empty_collection(ctx, database, collection),

            // Database commands
            Command::ListDatabases => databases::list_databases(ctx),
            Command::CreateDatabase { database } => databases::create_database(ctx, database),
            Command::DropDatabase { database } => databases::drop_database(ctx, database),
        }
    }

    /// Execute multiple commands sequentially.
    ///
    /// Returns all results in the same order as the input commands.
    /// Execution continues even if some commands fail.
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    /// Configuration the executor was built with.
    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// The underlying store.
    ///
    /// This is an escape hatch for seeding and inspection.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.ctx.store
    }
}
