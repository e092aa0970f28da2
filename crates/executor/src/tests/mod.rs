//! Test modules for the executor crate.

pub mod admin;
pub mod documents;

use std::sync::Arc;

use docadmin_engine::{MemoryStore, Store};

use crate::{ConsoleConfig, Executor};

/// Create a test executor over an empty in-memory store.
pub fn create_test_executor() -> (Executor, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let executor = Executor::new(store.clone() as Arc<dyn Store>, ConsoleConfig::default()).unwrap();
    (executor, store)
}
