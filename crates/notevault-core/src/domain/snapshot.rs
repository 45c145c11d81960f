//! Persisted form of a [`FileRecord`](super::FileRecord)
//!
//! One snapshot file holds an unordered JSON array of these records,
//! describing the files known after the previous run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single entry of the snapshot file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Name of the dated folder the file was saved under
    #[serde(default)]
    pub saved: String,
    /// Absolute path of that folder
    pub current_loc: String,
    /// Device uri, relative to the device root
    pub uri: String,
    /// Modification time, `YYYY-MM-DD HH:MM:SS`
    pub modified: String,
    /// Size in bytes as reported by the device
    pub size: u64,
}

impl SnapshotRecord {
    /// The folder currently holding the file's bytes
    pub fn location(&self) -> PathBuf {
        PathBuf::from(&self.current_loc)
    }
}
