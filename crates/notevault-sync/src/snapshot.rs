//! Snapshot store
//!
//! Persists the set of files known after a run as a JSON array of
//! [`SnapshotRecord`]s, and loads it back at the start of the next run.
//! An absent or unreadable snapshot means "nothing known": the run then
//! downloads everything it sees.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notevault_core::domain::{FileRecord, FileUri, SnapshotRecord};
use notevault_core::ports::{IBackupReporter, ILocalStorage};
use tracing::{debug, info, instrument};

use crate::SyncError;

/// Reads and writes the snapshot file through the storage port
pub struct SnapshotStore {
    storage: Arc<dyn ILocalStorage>,
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(storage: Arc<dyn ILocalStorage>, path: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previous run's records
    ///
    /// Never fails: a missing file is a first run, and an unreadable or
    /// malformed file is reported as a warning and treated as empty.
    /// Records with a bad timestamp are kept with the sentinel date.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self, reporter: &dyn IBackupReporter) -> Vec<FileRecord> {
        match self.storage.exists(&self.path).await {
            Ok(true) => {}
            Ok(false) => {
                info!("No snapshot found, starting fresh");
                return Vec::new();
            }
            Err(e) => {
                reporter.on_warning(&format!(
                    "Unable to check snapshot {}: {e:#}",
                    self.path.display()
                ));
                return Vec::new();
            }
        }

        let data = match self.storage.read_file(&self.path).await {
            Ok(data) => data,
            Err(e) => {
                reporter.on_warning(&format!(
                    "Unable to read snapshot {}: {e:#}",
                    self.path.display()
                ));
                return Vec::new();
            }
        };

        let records: Vec<SnapshotRecord> = match serde_json::from_slice(&data) {
            Ok(records) => records,
            Err(e) => {
                reporter.on_warning(&format!(
                    "Unable to decode snapshot {}: {e}",
                    self.path.display()
                ));
                return Vec::new();
            }
        };

        let mut loaded = Vec::with_capacity(records.len());
        for record in records {
            let uri = match FileUri::new(record.uri.as_str()) {
                Ok(uri) => uri,
                Err(e) => {
                    reporter.on_warning(&format!("Snapshot entry skipped: {e}"));
                    continue;
                }
            };
            match FileRecord::new(record.location(), uri, &record.modified, record.size) {
                Ok(file) => loaded.push(file),
                Err(e) => {
                    reporter.on_warning(&e.to_string());
                    loaded.push(e.into_record());
                }
            }
        }

        debug!(records = loaded.len(), "Snapshot loaded");
        loaded
    }

    /// Writes `records` as the new snapshot, replacing the old one atomically
    ///
    /// Records are sorted by uri so consecutive snapshots diff cleanly.
    ///
    /// # Errors
    /// Returns [`SyncError::Io`] if the file cannot be written.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn save<'a>(
        &self,
        records: impl IntoIterator<Item = &'a FileRecord>,
    ) -> Result<usize, SyncError> {
        let mut snapshot: Vec<SnapshotRecord> = records
            .into_iter()
            .map(FileRecord::to_snapshot_record)
            .collect();
        snapshot.sort_by(|a, b| a.uri.cmp(&b.uri));

        let json = serde_json::to_vec(&snapshot)?;
        self.storage
            .write_file(&self.path, &json)
            .await
            .map_err(|e| SyncError::io(&self.path, e))?;

        info!(records = snapshot.len(), "Snapshot saved");
        Ok(snapshot.len())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use tempfile::TempDir;

    use super::*;
    use crate::filesystem::LocalStorageAdapter;
    use crate::testing::{day, RecordingReporter};

    fn store(dir: &TempDir) -> SnapshotStore {
        SnapshotStore::new(
            Arc::new(LocalStorageAdapter::new()),
            dir.path().join("metadata.json"),
        )
    }

    fn record(base: &Path, uri: &str, modified: &str, size: u64) -> FileRecord {
        FileRecord::new(base, FileUri::new(uri).unwrap(), modified, size).unwrap()
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_empty_without_warning() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::default();

        assert!(store(&dir).load(&reporter).await.is_empty());
        assert!(reporter.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_empty_with_warning() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::default();
        std::fs::write(dir.path().join("metadata.json"), b"[{\"uri\": ").unwrap();

        assert!(store(&dir).load(&reporter).await.is_empty());
        assert_eq!(reporter.warnings().len(), 1);
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_location_and_identity() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::default();
        let store = store(&dir);
        let monday = day(dir.path(), "2024-03-04");
        let tuesday = day(dir.path(), "2024-03-05");
        let originals = vec![
            record(&monday, "Note/a.note", "2024-03-01 10:00:00", 10),
            record(&tuesday, "Note/Work/b.note", "2024-03-05 08:30:15", 20),
        ];

        assert_eq!(store.save(&originals).await.unwrap(), 2);
        let loaded = store.load(&reporter).await;

        assert_eq!(
            loaded.iter().cloned().collect::<HashSet<_>>(),
            originals.iter().cloned().collect::<HashSet<_>>()
        );
        for original in &originals {
            let back = loaded.iter().find(|r| *r == original).unwrap();
            assert_eq!(back.base_path(), original.base_path());
            assert_eq!(back.save_date(), original.save_date());
        }
        assert!(reporter.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_saved_json_shape() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let base = day(dir.path(), "2024-03-04");
        store
            .save(&[record(&base, "/Note/a.note", "2024-03-01 10:00", 10)])
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value.as_array().unwrap()[0];
        assert_eq!(entry["saved"], "2024-03-04");
        assert_eq!(entry["uri"], "Note/a.note");
        assert_eq!(entry["modified"], "2024-03-01 10:00:00");
        assert_eq!(entry["size"], 10);
        assert!(entry["current_loc"].as_str().unwrap().ends_with("2024-03-04"));
    }

    #[tokio::test]
    async fn test_bad_date_in_snapshot_is_kept_with_warning() {
        let dir = TempDir::new().unwrap();
        let reporter = RecordingReporter::default();
        std::fs::write(
            dir.path().join("metadata.json"),
            r#"[{"saved": "2024-03-04", "current_loc": "/b/2024-03-04", "uri": "Note/a.note", "modified": "yesterday", "size": 3}]"#,
        )
        .unwrap();

        let loaded = store(&dir).load(&reporter).await;
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].has_unknown_date());
        assert_eq!(reporter.warnings().len(), 1);
    }
}
