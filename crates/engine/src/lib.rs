//! Storage side of the document console
//!
//! This crate holds everything that talks to the document store:
//! - [`Collection`] / [`Store`]: the capability set the console needs from a
//!   store
//! - [`MemoryStore`]: in-memory reference store with exact-type matching
//! - [`repair_collection`]: journaled migration of non-canonical `_id`s to
//!   typed ids
//!
//! Identifier resolution and payload normalization are pure and live in
//! `docadmin-core`; nothing here calls them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod memory;
pub mod repair;

pub use collection::{Collection, DeleteResult, Store, UpdateResult};
pub use memory::{MemoryCollection, MemoryStore};
pub use repair::{
    repair_collection, FileJournal, JournalEntry, JournalPhase, MemoryJournal, RepairGuard,
    RepairJournal, RepairOutcome, RepairRecord, RepairState,
};
