//! FileRecord domain entity
//!
//! A [`FileRecord`] describes one file, either observed on the device during
//! today's walk or read back from the previous run's snapshot.
//!
//! ## Identity
//!
//! Two records are equal, and hash identically, when their
//! `(file_uri, last_modified, file_size)` triples match. The `base_path`
//! (which dated folder the file currently lives in) is deliberately not part
//! of the identity: the reconciler relies on "same uri, same mtime, same size"
//! meaning "same file" no matter which folder holds the bytes.
//!
//! A consequence is that a file whose mtime or size changed appears as a
//! *different* record; in set algebra it shows up both as a new file in
//! today's set and as a missing file in the previous set.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};

use super::errors::{BadDateError, DomainError};
use super::newtypes::FileUri;
use super::snapshot::SnapshotRecord;

/// Format used when persisting modification times
pub const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp shapes accepted from the device listing and the snapshot
const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// The "unknown" modification time given to records whose timestamp
/// could not be parsed: 2000-01-01 00:00:00
#[must_use]
pub fn sentinel_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Parse an ISO-like timestamp (`YYYY-MM-DD[ T]HH:MM[:SS[.fff]]` or a
/// bare `YYYY-MM-DD`)
#[must_use]
pub fn parse_modified(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ACCEPTED_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// One remote or previously-recorded file
#[derive(Clone)]
pub struct FileRecord {
    base_path: PathBuf,
    file_uri: FileUri,
    last_modified: NaiveDateTime,
    file_size: u64,
    /// Content held only between download and flush to disk
    file_bytes: Vec<u8>,
}

impl FileRecord {
    /// Build a record from a raw modification timestamp
    ///
    /// # Errors
    /// If `modified` cannot be parsed, returns a [`BadDateError`] that still
    /// carries a usable record dated [`sentinel_date`].
    pub fn new(
        base_path: impl Into<PathBuf>,
        file_uri: FileUri,
        modified: &str,
        file_size: u64,
    ) -> Result<Self, BadDateError> {
        match parse_modified(modified) {
            Some(last_modified) => Ok(Self::with_modified(
                base_path,
                file_uri,
                last_modified,
                file_size,
            )),
            None => {
                let record = Self::with_modified(base_path, file_uri, sentinel_date(), file_size);
                Err(BadDateError::new(modified, record))
            }
        }
    }

    /// Build a record from an already parsed modification time
    #[must_use]
    pub fn with_modified(
        base_path: impl Into<PathBuf>,
        file_uri: FileUri,
        last_modified: NaiveDateTime,
        file_size: u64,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            file_uri,
            last_modified,
            file_size,
            file_bytes: Vec::new(),
        }
    }

    /// A copy of this record re-pointed at another folder
    ///
    /// Identity is preserved; the transient content buffer is not carried over.
    #[must_use]
    pub fn with_base_path(&self, base_path: impl Into<PathBuf>) -> Self {
        Self::with_modified(
            base_path,
            self.file_uri.clone(),
            self.last_modified,
            self.file_size,
        )
    }

    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn file_uri(&self) -> &FileUri {
        &self.file_uri
    }

    #[must_use]
    pub fn last_modified(&self) -> NaiveDateTime {
        self.last_modified
    }

    /// True when the modification time is the "unknown" sentinel
    #[must_use]
    pub fn has_unknown_date(&self) -> bool {
        self.last_modified == sentinel_date()
    }

    /// Size in bytes as reported by the listing or the snapshot
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Name of the folder the record lives under (a `YYYY-MM-DD` date for
    /// records placed in a backup folder)
    #[must_use]
    pub fn save_date(&self) -> String {
        self.base_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `base_path` joined with the device uri
    #[must_use]
    pub fn full_path(&self) -> PathBuf {
        self.file_uri.under(&self.base_path)
    }

    #[must_use]
    pub fn file_bytes(&self) -> &[u8] {
        &self.file_bytes
    }

    pub fn set_file_bytes(&mut self, bytes: Vec<u8>) {
        self.file_bytes = bytes;
    }

    /// Take the content out of the record, leaving it empty
    pub fn take_file_bytes(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.file_bytes)
    }

    /// SHA-256 hex digest of the loaded content
    ///
    /// # Errors
    /// Returns [`DomainError::EmptyBytes`] when no content is loaded
    pub fn file_hash(&self) -> Result<String, DomainError> {
        if self.file_bytes.is_empty() {
            return Err(DomainError::EmptyBytes(self.file_uri.to_string()));
        }
        Ok(format!("{:x}", Sha256::digest(&self.file_bytes)))
    }

    /// The persisted form of this record
    #[must_use]
    pub fn to_snapshot_record(&self) -> SnapshotRecord {
        SnapshotRecord {
            saved: self.save_date(),
            current_loc: self.base_path.to_string_lossy().replace('\\', "/"),
            uri: self.file_uri.as_str().to_string(),
            modified: self.last_modified.format(MODIFIED_FORMAT).to_string(),
            size: self.file_size,
        }
    }

    fn identity(&self) -> (&FileUri, NaiveDateTime, u64) {
        (&self.file_uri, self.last_modified, self.file_size)
    }
}

impl PartialEq for FileRecord {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for FileRecord {}

impl Hash for FileRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for FileRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileRecord {
    /// Oldest first, then smallest; uri breaks ties so ordering agrees with `Eq`
    fn cmp(&self, other: &Self) -> Ordering {
        (self.last_modified, self.file_size)
            .cmp(&(other.last_modified, other.file_size))
            .then_with(|| self.file_uri.cmp(&other.file_uri))
    }
}

impl fmt::Debug for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileRecord")
            .field("base_path", &self.base_path)
            .field("file_uri", &self.file_uri)
            .field("last_modified", &self.last_modified)
            .field("file_size", &self.file_size)
            .field("file_bytes", &self.file_bytes.len())
            .finish()
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} bytes)",
            self.file_uri,
            self.last_modified.format(MODIFIED_FORMAT),
            self.file_size
        )
    }
}
