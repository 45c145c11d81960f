//! Reconciler
//!
//! Pure set algebra over file identities. Two records are the same file when
//! their (uri, modified, size) triples match, wherever they are stored.
//!
//! Given today's remote set A and the previous snapshot B:
//! - deleted: members of B whose identity is absent from A
//! - to fetch: A - B
//! - unchanged: A ∩ B, each paired with the previous copy to read from
//!
//! A file whose mtime or size changed is both fetched (new identity) and
//! reported deleted (old identity).

use std::collections::HashSet;
use std::path::PathBuf;

use notevault_core::domain::FileRecord;

/// An unchanged file to carry into today's folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarryForward {
    /// The previous copy, under its old dated folder
    pub source: FileRecord,
    /// The same identity re-pointed at today's folder
    pub target: FileRecord,
}

impl CarryForward {
    /// False when source and target are the same file on disk, as on a
    /// second run the same day
    pub fn needs_copy(&self) -> bool {
        self.source_path() != self.target_path()
    }

    pub fn source_path(&self) -> PathBuf {
        self.source.full_path()
    }

    pub fn target_path(&self) -> PathBuf {
        self.target.full_path()
    }
}

/// Outcome of comparing today's listing with the previous snapshot
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub deleted: Vec<FileRecord>,
    pub to_fetch: Vec<FileRecord>,
    pub unchanged: Vec<CarryForward>,
}

impl Reconciliation {
    /// True when the run would record nothing in the new snapshot
    pub fn is_empty(&self) -> bool {
        self.to_fetch.is_empty() && self.unchanged.is_empty()
    }

    /// Records that make up the next snapshot
    pub fn snapshot_records(&self) -> impl Iterator<Item = &FileRecord> {
        self.to_fetch
            .iter()
            .chain(self.unchanged.iter().map(|c| &c.target))
    }

    /// Targets of the unchanged set
    pub fn unchanged_targets(&self) -> Vec<FileRecord> {
        self.unchanged.iter().map(|c| c.target.clone()).collect()
    }
}

/// Previous records whose identity no longer appears on the device
///
/// Computed as the symmetric difference filtered to members not in
/// `current`, sorted oldest first.
pub fn check_for_deleted(
    current: &HashSet<FileRecord>,
    previous: &HashSet<FileRecord>,
) -> Vec<FileRecord> {
    let mut deleted: Vec<FileRecord> = current
        .symmetric_difference(previous)
        .filter(|record| !current.contains(*record))
        .cloned()
        .collect();
    deleted.sort();
    deleted
}

/// Classifies every file of `today` against `previous`
///
/// Records in `today` carry today's folder as their base path. With
/// `full_backup`, deletions are still reported but nothing counts as
/// unchanged.
pub fn reconcile(
    today: &HashSet<FileRecord>,
    previous: HashSet<FileRecord>,
    full_backup: bool,
) -> Reconciliation {
    let deleted = check_for_deleted(today, &previous);

    let mut previous = previous;
    for record in &deleted {
        previous.remove(record);
    }
    if full_backup {
        previous.clear();
    }

    let mut to_fetch = Vec::new();
    let mut unchanged = Vec::new();
    for record in today {
        match previous.get(record) {
            Some(source) => unchanged.push(CarryForward {
                source: source.clone(),
                target: source.with_base_path(record.base_path()),
            }),
            None => to_fetch.push(record.clone()),
        }
    }
    to_fetch.sort();
    unchanged.sort_by(|a, b| a.target.cmp(&b.target));

    Reconciliation {
        deleted,
        to_fetch,
        unchanged,
    }
}
