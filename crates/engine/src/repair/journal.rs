//! Repair journal
//!
//! Each repaired document goes through delete-then-reinsert, which the store
//! cannot do atomically. Before touching the store the repair procedure
//! records what it is about to do; after each step it records the new phase.
//! A run that dies between the delete and the reinsert leaves a `Deleted`
//! entry behind, and the next run reinserts the journaled document.
//!
//! Two journals are provided:
//! - [`MemoryJournal`]: lives as long as the process, for tests and ephemeral
//!   consoles
//! - [`FileJournal`]: append-only JSON lines, one entry per line, values in
//!   canonical extended JSON
//!
//! Finished entries are dropped by [`RepairJournal::compact`], which keeps
//! only the latest unfinished entry per original id. The repair procedure
//! compacts after reconciling; `FileJournal::open` compacts on load.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use docadmin_core::{ejson, Document, Result, Value};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Progress of one document through a repair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalPhase {
    /// Recorded, nothing written to the store yet
    Pending,
    /// Original removed, canonical copy not yet inserted
    Deleted,
    /// Canonical copy inserted, or nothing left to do
    Completed,
}

/// One journaled repair step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Namespace of the collection being repaired
    pub collection: String,
    /// `_id` as it was stored before the repair
    #[serde(
        serialize_with = "ejson::serialize_value",
        deserialize_with = "ejson::deserialize_value"
    )]
    pub original_id: Value,
    /// Full document carrying the canonical `_id`
    #[serde(
        serialize_with = "ejson::serialize_document",
        deserialize_with = "ejson::deserialize_document"
    )]
    pub document: Document,
    /// Phase reached
    pub phase: JournalPhase,
}

impl JournalEntry {
    /// Entry for `document` in `collection`, at phase [`JournalPhase::Pending`]
    pub fn pending(collection: &str, original_id: Value, document: Document) -> Self {
        JournalEntry {
            collection: collection.to_string(),
            original_id,
            document,
            phase: JournalPhase::Pending,
        }
    }

    /// Same entry advanced to `phase`
    pub fn advance(&self, phase: JournalPhase) -> Self {
        JournalEntry {
            phase,
            ..self.clone()
        }
    }

    /// True unless the entry reached [`JournalPhase::Completed`]
    pub fn is_unfinished(&self) -> bool {
        self.phase != JournalPhase::Completed
    }

    // Original ids of different types never collide once rendered canonically.
    fn key(&self) -> (String, String) {
        (
            self.collection.clone(),
            ejson::to_string(&self.original_id, ejson::Mode::Canonical),
        )
    }
}

/// Durable record of repair progress
pub trait RepairJournal: Send + Sync {
    /// Record an entry; a later entry for the same collection and original id
    /// supersedes earlier ones
    fn record(&self, entry: &JournalEntry) -> Result<()>;

    /// Latest entry for every original id in `collection` that has not
    /// reached [`JournalPhase::Completed`], in first-recorded order
    fn pending(&self, collection: &str) -> Result<Vec<JournalEntry>>;

    /// Drop superseded and completed entries across all collections
    ///
    /// Returns the number of entries removed. What `pending` reports is
    /// unchanged.
    fn compact(&self) -> Result<usize>;
}

fn latest_unfinished<I>(entries: I, collection: &str) -> Vec<JournalEntry>
where
    I: IntoIterator<Item = JournalEntry>,
{
    live_entries(
        entries
            .into_iter()
            .filter(|entry| entry.collection == collection),
    )
}

// Latest entry per key wins, first-seen order is kept, completed keys go.
fn live_entries<I>(entries: I) -> Vec<JournalEntry>
where
    I: IntoIterator<Item = JournalEntry>,
{
    let mut order: Vec<(String, String)> = Vec::new();
    let mut latest: HashMap<(String, String), JournalEntry> = HashMap::new();
    for entry in entries {
        let key = entry.key();
        if !latest.contains_key(&key) {
            order.push(key.clone());
        }
        latest.insert(key, entry);
    }
    order
        .into_iter()
        .filter_map(|key| latest.remove(&key))
        .filter(JournalEntry::is_unfinished)
        .collect()
}

// =============================================================================
// MemoryJournal
// =============================================================================

/// Journal kept in process memory
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Mutex<Vec<JournalEntry>>,
}

impl MemoryJournal {
    /// Create an empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Every entry recorded so far, oldest first
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().clone()
    }
}

impl RepairJournal for MemoryJournal {
    fn record(&self, entry: &JournalEntry) -> Result<()> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }

    fn pending(&self, collection: &str) -> Result<Vec<JournalEntry>> {
        Ok(latest_unfinished(self.entries(), collection))
    }

    fn compact(&self) -> Result<usize> {
        let mut entries = self.entries.lock();
        let before = entries.len();
        let live = live_entries(entries.drain(..));
        *entries = live;
        Ok(before - entries.len())
    }
}

// =============================================================================
// FileJournal
// =============================================================================

/// Append-only journal file, one JSON entry per line
///
/// Every record is synced before `record` returns. A line cut short by a
/// crash is skipped on load. Compaction rewrites the live entries to a
/// sibling file and renames it over the journal.
#[derive(Debug)]
pub struct FileJournal {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileJournal {
    /// Open the journal at `path`, creating it and its parent directory if
    /// needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;

        // A torn final line must not swallow the next record
        if ends_without_newline(&mut file)? {
            file.write_all(b"\n")?;
            file.sync_data()?;
        }

        let journal = FileJournal {
            path,
            file: Mutex::new(file),
        };
        let dropped = journal.compact()?;
        if dropped > 0 {
            tracing::debug!(
                target: "docadmin::repair",
                path = %journal.path.display(),
                dropped,
                "Compacted repair journal"
            );
        }
        Ok(journal)
    }

    /// Location of the journal file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every readable entry in the file, oldest first
    pub fn entries(&self) -> Result<Vec<JournalEntry>> {
        // Hold the writer lock so no half-written line is read
        let _writer = self.file.lock();
        read_entries(&self.path)
    }

    fn compaction_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".compact");
        PathBuf::from(name)
    }
}

fn read_entries(path: &Path) -> Result<Vec<JournalEntry>> {
    let reader = BufReader::new(File::open(path)?);

    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<JournalEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    target: "docadmin::repair",
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping unreadable repair journal line"
                );
            }
        }
    }
    Ok(entries)
}

fn ends_without_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl RepairJournal for FileJournal {
    fn record(&self, entry: &JournalEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    fn pending(&self, collection: &str) -> Result<Vec<JournalEntry>> {
        Ok(latest_unfinished(self.entries()?, collection))
    }

    fn compact(&self) -> Result<usize> {
        let mut file = self.file.lock();
        let entries = read_entries(&self.path)?;
        let before = entries.len();
        let live = live_entries(entries);
        if live.len() == before {
            return Ok(0);
        }

        let tmp_path = self.compaction_path();
        {
            let mut tmp = File::create(&tmp_path)?;
            for entry in &live {
                let mut line = serde_json::to_string(entry)?;
                line.push('\n');
                tmp.write_all(line.as_bytes())?;
            }
            tmp.sync_data()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        *file = OpenOptions::new()
            .append(true)
            .read(true)
            .open(&self.path)?;
        Ok(before - live.len())
    }
}
