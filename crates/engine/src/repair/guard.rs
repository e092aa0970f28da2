//! Single-flight guard for repair runs
//!
//! Repair deletes and reinserts documents one at a time. Two runs against the
//! same collection would each see the other's half-finished work, so runs are
//! serialized per collection namespace through a process-wide registry.

use std::collections::HashSet;

use docadmin_core::{Error, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

// =============================================================================
// Global Repair Registry
// =============================================================================
//
// Holds the namespaces that currently have a repair in flight. Entries are
// removed when the owning `RepairGuard` drops, including on panic unwind.

static ACTIVE_REPAIRS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Exclusive claim on a collection for the duration of one repair run
#[derive(Debug)]
pub struct RepairGuard {
    namespace: String,
}

impl RepairGuard {
    /// Claim `namespace`, or fail with [`Error::RepairInProgress`] if another
    /// run holds it
    pub fn acquire(namespace: &str) -> Result<Self> {
        let mut active = ACTIVE_REPAIRS.lock();
        if !active.insert(namespace.to_string()) {
            return Err(Error::RepairInProgress {
                collection: namespace.to_string(),
            });
        }
        Ok(RepairGuard {
            namespace: namespace.to_string(),
        })
    }

    /// Namespace this guard holds
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// True if a repair currently holds `namespace`
    pub fn is_active(namespace: &str) -> bool {
        ACTIVE_REPAIRS.lock().contains(namespace)
    }
}

impl Drop for RepairGuard {
    fn drop(&mut self) {
        ACTIVE_REPAIRS.lock().remove(&self.namespace);
    }
}
