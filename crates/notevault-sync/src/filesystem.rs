//! Local storage adapter (secondary/driven adapter)
//!
//! Implements [`ILocalStorage`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Durable writes**: data goes to a sibling temp file which is fsync'd
//!   and then renamed over the target, so a crash never leaves a truncated
//!   backup file under its final name. On Unix the parent directory is
//!   fsync'd after the rename so the new entry itself is durable.
//! - **Directory listing**: only immediate sub-directories are returned;
//!   retention pruning is the only caller.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use notevault_core::ports::ILocalStorage;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Adapter that bridges the [`ILocalStorage`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from the path arguments.
#[derive(Debug, Clone, Default)]
pub struct LocalStorageAdapter;

impl LocalStorageAdapter {
    /// Create a new `LocalStorageAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Flushes a directory's entries to disk
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// `<target>.tmp`, in the same directory so rename stays on one filesystem
fn temp_path_for(target: &Path) -> PathBuf {
    let mut p = target.as_os_str().to_owned();
    p.push(".tmp");
    PathBuf::from(p)
}

#[async_trait::async_trait]
impl ILocalStorage for LocalStorageAdapter {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>> {
        debug!("reading file");
        let data = tokio::fs::read(path).await?;
        debug!(bytes = data.len(), "file read complete");
        Ok(data)
    }

    #[instrument(skip(self, data), fields(path = %path.display(), bytes = data.len()))]
    async fn write_file(&self, path: &Path, data: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = temp_path_for(path);
        debug!(?tmp_path, "writing to temporary file");
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        debug!("renaming temporary file to target");
        if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            sync_dir(parent).await?;
        }

        debug!("write complete");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn exists(&self, path: &Path) -> anyhow::Result<bool> {
        Ok(tokio::fs::try_exists(path).await?)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn list_dirs(&self, path: &Path) -> anyhow::Result<Vec<String>> {
        let mut entries = match tokio::fs::read_dir(path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("directory not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        debug!(count = names.len(), "directories listed");
        Ok(names)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn remove_dir_all(&self, path: &Path) -> anyhow::Result<()> {
        debug!("removing directory recursively");
        tokio::fs::remove_dir_all(path).await?;
        Ok(())
    }
}

// ============================================================================
// Unit tests
// ============================================================================
