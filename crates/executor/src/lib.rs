//! # docadmin Executor
//!
//! The layer a route handler calls into. It provides:
//! - [`Console`] - typed methods for every console operation
//! - [`Command`]/[`Output`] - serializable command interface
//! - [`ConsoleConfig`] - settings loaded from `docadmin.toml`
//!
//! ## Quick Start
//!
//! ```text
//! use docadmin_executor::Console;
//! use docadmin_engine::MemoryStore;
//! use serde_json::json;
//!
//! let console = Console::new(Arc::new(MemoryStore::new()), ConsoleConfig::default())?;
//!
//! // A client that only ever saw the hex string can still update the document
//! console.update_document("shop", "orders", json!("6945cd5054b616d899e8f4e8"), json!({"qty": 2}))?;
//!
//! // Migrate ids some older client stored as strings
//! let outcome = console.repair_collection("shop", "orders")?;
//! println!("repaired {}, skipped {}", outcome.repaired, outcome.skipped());
//! ```
//!
//! ## Identifiers
//!
//! Ids arrive as whatever the browser had: a hex string, a `{"$oid": …}`
//! object, a serialized form of either, or a flattened byte buffer. Every
//! document command resolves them to a filter matching both the typed and
//! the string form, so the command works however the `_id` was stored.

#![warn(missing_docs)]

pub(crate) mod bridge;
mod command;
mod config;
mod console;
mod convert;
mod error;
mod executor;
mod output;
mod types;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use command::Command;
pub use config::{ConsoleConfig, RepairConfig, CONFIG_FILE_NAME};
pub use console::Console;
pub use error::Error;
pub use executor::Executor;
pub use output::Output;
pub use types::*;

// Re-export repair results so users don't need docadmin-engine directly
pub use docadmin_engine::{RepairOutcome, RepairRecord, RepairState, UpdateResult};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
