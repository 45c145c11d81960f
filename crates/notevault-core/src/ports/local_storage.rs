//! Local storage port (driven/secondary port)
//!
//! This module defines the interface for reading and writing bytes under the
//! backup save directory.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific.
//! - `write_file` must be durable: once it returns, a crash must not leave a
//!   truncated file that the next run would accept as a valid backup.

use std::path::Path;

// ============================================================================
// ILocalStorage trait
// ============================================================================

/// Port trait for local storage operations
///
/// ## Implementation Notes
///
/// - Paths are absolute or relative to the process working directory;
///   the engine always passes paths below the configured save directory.
/// - `list_dirs` returns only immediate sub-directory names, unsorted.
#[async_trait::async_trait]
pub trait ILocalStorage: Send + Sync {
    /// Reads the entire contents of a file
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be read
    async fn read_file(&self, path: &Path) -> anyhow::Result<Vec<u8>>;

    /// Writes data to a file, replacing any existing content
    ///
    /// Parent directories are created as needed and the data is flushed to
    /// durable storage before returning.
    async fn write_file(&self, path: &Path, data: &[u8]) -> anyhow::Result<()>;

    /// Returns true if something exists at `path`
    async fn exists(&self, path: &Path) -> anyhow::Result<bool>;

    /// Names of the immediate sub-directories of `path`
    ///
    /// A missing `path` yields an empty list.
    async fn list_dirs(&self, path: &Path) -> anyhow::Result<Vec<String>>;

    /// Recursively deletes a directory
    async fn remove_dir_all(&self, path: &Path) -> anyhow::Result<()>;
}
