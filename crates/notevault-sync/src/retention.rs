//! Retention pruning of dated backup folders
//!
//! Only sub-directories named `YYYY-MM-DD` are candidates; anything else in
//! the save directory (the snapshot, the log, user folders) is left alone.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use notevault_core::domain::{is_dated_folder, DatedFolder};
use notevault_core::ports::ILocalStorage;
use tracing::{debug, info, instrument};

use crate::SyncError;

/// Deletes all but the `keep` most recent dated folders under `save_dir`
///
/// `keep == 0` disables pruning. The folder for `today` is never removed,
/// even when future-dated folders push it past `keep`. In that case
/// `keep + 1` dated folders remain instead of `keep`.
///
/// Returns the removed folders, newest first.
///
/// # Errors
/// Returns [`SyncError::Io`] if the save directory cannot be listed or a
/// folder cannot be removed.
#[instrument(skip(storage))]
pub async fn prune_dated_folders(
    storage: &dyn ILocalStorage,
    save_dir: &Path,
    keep: usize,
    today: NaiveDate,
) -> Result<Vec<PathBuf>, SyncError> {
    if keep == 0 {
        debug!("Retention disabled");
        return Ok(Vec::new());
    }

    let mut names: Vec<String> = storage
        .list_dirs(save_dir)
        .await
        .map_err(|e| SyncError::io(save_dir, e))?
        .into_iter()
        .filter(|name| is_dated_folder(name))
        .collect();
    names.sort_unstable_by(|a, b| b.cmp(a));

    let protected = DatedFolder::for_date(save_dir, today).into_path_buf();
    let mut removed = Vec::new();
    for name in names.into_iter().skip(keep) {
        let path = save_dir.join(&name);
        if path == protected {
            continue;
        }
        storage
            .remove_dir_all(&path)
            .await
            .map_err(|e| SyncError::io(&path, e))?;
        info!(folder = %path.display(), "Pruned old backup folder");
        removed.push(path);
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::filesystem::LocalStorageAdapter;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn make_dirs(root: &Path, names: &[&str]) {
        for name in names {
            std::fs::create_dir_all(root.join(name).join("Note")).unwrap();
        }
    }

    fn remaining(root: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_keeps_newest_dated_folders() {
        let dir = TempDir::new().unwrap();
        make_dirs(
            dir.path(),
            &["2024-01-01", "2024-02-01", "2024-03-01", "2024-03-02"],
        );
        std::fs::write(dir.path().join("metadata.json"), b"[]").unwrap();

        let removed = prune_dated_folders(
            &LocalStorageAdapter::new(),
            dir.path(),
            2,
            date("2024-03-02"),
        )
        .await
        .unwrap();

        assert_eq!(
            removed,
            vec![dir.path().join("2024-02-01"), dir.path().join("2024-01-01")]
        );
        assert_eq!(
            remaining(dir.path()),
            vec!["2024-03-01", "2024-03-02", "metadata.json"]
        );
    }

    #[tokio::test]
    async fn test_ignores_non_dated_folders() {
        let dir = TempDir::new().unwrap();
        make_dirs(dir.path(), &["2024-01-01", "2024-03-02", "archive", "2024-1-1"]);

        let removed = prune_dated_folders(
            &LocalStorageAdapter::new(),
            dir.path(),
            1,
            date("2024-03-02"),
        )
        .await
        .unwrap();

        assert_eq!(removed, vec![dir.path().join("2024-01-01")]);
        assert_eq!(remaining(dir.path()), vec!["2024-03-02", "2024-1-1", "archive"]);
    }

    #[tokio::test]
    async fn test_keep_zero_is_noop() {
        let dir = TempDir::new().unwrap();
        make_dirs(dir.path(), &["2024-01-01", "2024-03-02"]);

        let removed = prune_dated_folders(
            &LocalStorageAdapter::new(),
            dir.path(),
            0,
            date("2024-03-02"),
        )
        .await
        .unwrap();

        assert!(removed.is_empty());
        assert_eq!(remaining(dir.path()).len(), 2);
    }

    #[tokio::test]
    async fn test_fewer_folders_than_keep() {
        let dir = TempDir::new().unwrap();
        make_dirs(dir.path(), &["2024-03-02"]);

        let removed = prune_dated_folders(
            &LocalStorageAdapter::new(),
            dir.path(),
            10,
            date("2024-03-02"),
        )
        .await
        .unwrap();
        assert!(removed.is_empty());
    }

    #[tokio::test]
    async fn test_today_survives_future_dated_folders() {
        let dir = TempDir::new().unwrap();
        make_dirs(dir.path(), &["2030-01-01", "2024-03-02", "2024-03-01"]);

        let removed = prune_dated_folders(
            &LocalStorageAdapter::new(),
            dir.path(),
            1,
            date("2024-03-02"),
        )
        .await
        .unwrap();

        assert_eq!(removed, vec![dir.path().join("2024-03-01")]);
        // keep + 1 folders survive when today falls outside the newest `keep`
        assert_eq!(remaining(dir.path()), vec!["2024-03-02", "2030-01-01"]);
    }
}
