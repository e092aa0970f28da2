//! Identifier repair
//!
//! Migrates every document whose `_id` is a non-canonical rendering of a
//! typed id (hex string, `$oid` wrapper, flattened byte buffer) to the typed
//! form. The store has no rename-key operation, so each document is deleted
//! and reinserted under its canonical id.
//!
//! ## Safety
//!
//! - Runs are serialized per collection by [`RepairGuard`].
//! - Every delete/reinsert is journaled. A run that stops between the two
//!   steps leaves a `Deleted` entry, and the next run reinserts the document
//!   before scanning. Finished entries are then compacted away.
//! - A document whose canonical id is already taken is left alone.
//! - Per-document failures are counted, never fatal.

mod guard;
mod journal;

pub use guard::RepairGuard;
pub use journal::{FileJournal, JournalEntry, JournalPhase, MemoryJournal, RepairJournal};

use docadmin_core::{ejson, Document, Filter, ObjectId, RawId, Result, Value, ID_FIELD};
use serde::{Deserialize, Serialize};

use crate::collection::Collection;

/// What happened to one document during a repair run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RepairState {
    /// Reinserted under its canonical id
    Repaired,
    /// No canonical id could be derived; document untouched
    Underivable,
    /// Another document already holds the canonical id; document untouched
    TargetExists,
    /// Delete did not remove the document; document untouched
    DeleteFailed {
        /// Store error or reason nothing was deleted
        reason: String,
    },
    /// Original deleted but the canonical copy was not inserted
    ReinsertFailed {
        /// Store error
        reason: String,
    },
}

/// Per-document result of a repair run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairRecord {
    /// `_id` as stored before the run
    #[serde(
        serialize_with = "ejson::serialize_value",
        deserialize_with = "ejson::deserialize_value"
    )]
    pub original_id: Value,
    /// Canonical id derived for it
    pub target: Option<ObjectId>,
    /// Outcome
    #[serde(flatten)]
    pub state: RepairState,
}

/// Counters and per-document records for one repair run
///
/// Documents already in canonical form are counted in `already_canonical`
/// and are neither repaired nor skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairOutcome {
    /// Namespace of the repaired collection
    pub collection: String,
    /// Documents reinserted under their canonical id
    pub repaired: u64,
    /// Documents whose `_id` was already a typed id
    pub already_canonical: u64,
    /// Documents with no derivable canonical id
    pub underivable: u64,
    /// Documents deleted but not reinserted
    pub partial_failures: u64,
    /// Documents left untouched because the delete failed or the canonical id
    /// was taken
    pub write_failures: u64,
    /// Interrupted repairs from an earlier run completed by this one
    pub reconciled: u64,
    /// Every non-canonical document visited, in scan order
    pub records: Vec<RepairRecord>,
}

impl RepairOutcome {
    fn new(collection: &str) -> Self {
        RepairOutcome {
            collection: collection.to_string(),
            ..Default::default()
        }
    }

    /// Documents left as they were
    pub fn skipped(&self) -> u64 {
        self.underivable + self.write_failures
    }

    /// Documents not repaired, including partial failures
    pub fn failed(&self) -> u64 {
        self.skipped() + self.partial_failures
    }

    fn push(&mut self, original_id: Value, target: Option<ObjectId>, state: RepairState) {
        match &state {
            RepairState::Repaired => self.repaired += 1,
            RepairState::Underivable => self.underivable += 1,
            RepairState::TargetExists | RepairState::DeleteFailed { .. } => {
                self.write_failures += 1
            }
            RepairState::ReinsertFailed { .. } => self.partial_failures += 1,
        }
        self.records.push(RepairRecord {
            original_id,
            target,
            state,
        });
    }
}

/// Repair every non-canonical `_id` in `collection`
///
/// Fails only if another repair of the same collection is running or the
/// journal or the initial scan cannot be read. Everything else is reported in
/// the returned [`RepairOutcome`].
pub fn repair_collection(
    collection: &dyn Collection,
    journal: &dyn RepairJournal,
) -> Result<RepairOutcome> {
    let namespace = collection.namespace();
    let _guard = RepairGuard::acquire(namespace)?;
    let mut outcome = RepairOutcome::new(namespace);

    reconcile(collection, journal, &mut outcome)?;
    match journal.compact() {
        Ok(0) => {}
        Ok(dropped) => tracing::debug!(
            target: "docadmin::repair",
            collection = %namespace,
            dropped,
            "Compacted repair journal"
        ),
        Err(e) => tracing::warn!(
            target: "docadmin::repair",
            collection = %namespace,
            error = %e,
            "Failed to compact repair journal"
        ),
    }

    for doc in collection.find(&Filter::All)? {
        let original_id = doc.id().cloned().unwrap_or(Value::Null);

        let raw = RawId::classify(&original_id);
        if raw.is_native() {
            outcome.already_canonical += 1;
            continue;
        }
        let Some(target) = raw.object_id() else {
            tracing::debug!(
                target: "docadmin::repair",
                collection = %namespace,
                id = %ejson::to_string(&original_id, ejson::Mode::Relaxed),
                "No canonical id derivable"
            );
            outcome.push(original_id, None, RepairState::Underivable);
            continue;
        };

        let state = repair_document(collection, journal, &doc, &original_id, target);
        outcome.push(original_id, Some(target), state);
    }

    tracing::info!(
        target: "docadmin::repair",
        collection = %namespace,
        repaired = outcome.repaired,
        already_canonical = outcome.already_canonical,
        underivable = outcome.underivable,
        write_failures = outcome.write_failures,
        partial_failures = outcome.partial_failures,
        reconciled = outcome.reconciled,
        "Identifier repair finished"
    );

    Ok(outcome)
}

fn repair_document(
    collection: &dyn Collection,
    journal: &dyn RepairJournal,
    doc: &Document,
    original_id: &Value,
    target: ObjectId,
) -> RepairState {
    let namespace = collection.namespace();
    let shown_id = ejson::to_string(original_id, ejson::Mode::Relaxed);

    match collection.count(&Filter::id(target)) {
        Ok(0) => {}
        Ok(_) => {
            tracing::warn!(
                target: "docadmin::repair",
                collection = %namespace,
                id = %shown_id,
                target_id = %target,
                "Canonical id already in use, leaving document as is"
            );
            return RepairState::TargetExists;
        }
        Err(e) => return delete_failed(namespace, &shown_id, e.to_string()),
    }

    let entry = JournalEntry::pending(namespace, original_id.clone(), doc.with_id(target.into()));
    if let Err(e) = journal.record(&entry) {
        return delete_failed(namespace, &shown_id, format!("journal: {}", e));
    }

    match collection.delete_one(&Filter::id(original_id.clone())) {
        Ok(res) if res.deleted > 0 => {}
        Ok(_) => {
            record_or_warn(journal, &entry.advance(JournalPhase::Completed), &shown_id);
            return delete_failed(namespace, &shown_id, "no document deleted".to_string());
        }
        Err(e) => {
            record_or_warn(journal, &entry.advance(JournalPhase::Completed), &shown_id);
            return delete_failed(namespace, &shown_id, e.to_string());
        }
    }

    // On failure the Pending entry still lets the next run detect the gap
    let deleted = entry.advance(JournalPhase::Deleted);
    record_or_warn(journal, &deleted, &shown_id);

    match collection.insert_one(entry.document.clone()) {
        Ok(_) => {
            record_or_warn(journal, &deleted.advance(JournalPhase::Completed), &shown_id);
            RepairState::Repaired
        }
        Err(e) => {
            tracing::error!(
                target: "docadmin::repair",
                collection = %namespace,
                id = %shown_id,
                target_id = %target,
                error = %e,
                "Document deleted but canonical copy not inserted; journaled for the next run"
            );
            RepairState::ReinsertFailed {
                reason: e.to_string(),
            }
        }
    }
}

fn record_or_warn(journal: &dyn RepairJournal, entry: &JournalEntry, shown_id: &str) {
    if let Err(e) = journal.record(entry) {
        tracing::warn!(
            target: "docadmin::repair",
            collection = %entry.collection,
            id = %shown_id,
            phase = ?entry.phase,
            error = %e,
            "Failed to journal repair step"
        );
    }
}

fn delete_failed(namespace: &str, shown_id: &str, reason: String) -> RepairState {
    tracing::warn!(
        target: "docadmin::repair",
        collection = %namespace,
        id = %shown_id,
        reason = %reason,
        "Skipping document"
    );
    RepairState::DeleteFailed { reason }
}

// Finish what an interrupted run left behind. A `Pending` entry whose
// original is still stored needs nothing; the scan repairs it again.
fn reconcile(
    collection: &dyn Collection,
    journal: &dyn RepairJournal,
    outcome: &mut RepairOutcome,
) -> Result<()> {
    let namespace = collection.namespace();

    for entry in journal.pending(namespace)? {
        let Some(canonical_id) = entry.document.get(ID_FIELD).cloned() else {
            journal.record(&entry.advance(JournalPhase::Completed))?;
            continue;
        };

        if collection.count(&Filter::id(canonical_id))? > 0 {
            journal.record(&entry.advance(JournalPhase::Completed))?;
            continue;
        }
        if entry.phase == JournalPhase::Pending
            && collection.count(&Filter::id(entry.original_id.clone()))? > 0
        {
            journal.record(&entry.advance(JournalPhase::Completed))?;
            continue;
        }

        match collection.insert_one(entry.document.clone()) {
            Ok(_) => {
                journal.record(&entry.advance(JournalPhase::Completed))?;
                outcome.reconciled += 1;
                tracing::info!(
                    target: "docadmin::repair",
                    collection = %namespace,
                    id = %ejson::to_string(&entry.original_id, ejson::Mode::Relaxed),
                    "Reinserted document from interrupted repair"
                );
            }
            Err(e) => {
                tracing::error!(
                    target: "docadmin::repair",
                    collection = %namespace,
                    id = %ejson::to_string(&entry.original_id, ejson::Mode::Relaxed),
                    error = %e,
                    "Could not reinsert document from interrupted repair"
                );
                outcome.partial_failures += 1;
            }
        }
    }
    Ok(())
}
