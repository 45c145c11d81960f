//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for device uris, dated
//! backup folders and the device's top-level folders. Each newtype ensures
//! data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// FileUri
// ============================================================================

/// A device path relative to the device root, e.g. `Note/Journal.note`
///
/// The device reports uris with a leading `/`. A single leading separator is
/// stripped so the uri composes as a relative join under a backup folder
/// instead of replacing it with an absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileUri(String);

impl FileUri {
    /// Create a new FileUri
    ///
    /// # Errors
    /// Returns error if the uri is empty after normalization or contains
    /// a `..` component
    pub fn new(uri: impl Into<String>) -> Result<Self, DomainError> {
        let uri = uri.into();
        let normalized = uri.strip_prefix('/').unwrap_or(&uri);

        if normalized.is_empty() {
            return Err(DomainError::InvalidUri(format!("Empty device uri: {uri:?}")));
        }

        if normalized.split('/').any(|component| component == "..") {
            return Err(DomainError::InvalidUri(format!(
                "Device uri contains invalid traversal: {uri}"
            )));
        }

        Ok(Self(normalized.to_string()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the file name component
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Resolve this uri under a local base directory
    #[must_use]
    pub fn under(&self, base: &Path) -> PathBuf {
        base.join(&self.0)
    }
}

impl Display for FileUri {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileUri {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FileUri {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FileUri> for String {
    fn from(uri: FileUri) -> Self {
        uri.0
    }
}

// ============================================================================
// DatedFolder
// ============================================================================

static DATED_FOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid dated folder pattern"));

/// Returns true if `name` follows the `YYYY-MM-DD` backup folder naming
#[must_use]
pub fn is_dated_folder(name: &str) -> bool {
    DATED_FOLDER_REGEX.is_match(name)
}

/// A per-day backup folder `<save_dir>/<YYYY-MM-DD>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatedFolder {
    path: PathBuf,
    date: NaiveDate,
}

impl DatedFolder {
    /// The folder for `date` under `save_dir`
    #[must_use]
    pub fn for_date(save_dir: &Path, date: NaiveDate) -> Self {
        Self {
            path: save_dir.join(date.format("%Y-%m-%d").to_string()),
            date,
        }
    }

    /// Parse an existing folder path whose last component is a date
    ///
    /// # Errors
    /// Returns error if the folder name is not a valid `YYYY-MM-DD` date
    pub fn from_path(path: PathBuf) -> Result<Self, DomainError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::InvalidDatedFolder(path.display().to_string()))?;

        if !is_dated_folder(name) {
            return Err(DomainError::InvalidDatedFolder(name.to_string()));
        }

        let date = NaiveDate::parse_from_str(name, "%Y-%m-%d")
            .map_err(|_| DomainError::InvalidDatedFolder(name.to_string()))?;

        Ok(Self { path, date })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl Display for DatedFolder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

// ============================================================================
// DeviceFolder
// ============================================================================

/// A top-level folder exposed by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceFolder {
    Note,
    Document,
    Export,
    MyStyle,
    Screenshot,
    Inbox,
}

impl DeviceFolder {
    /// Every folder, in listing order
    pub const ALL: [DeviceFolder; 6] = [
        DeviceFolder::Note,
        DeviceFolder::Document,
        DeviceFolder::Export,
        DeviceFolder::MyStyle,
        DeviceFolder::Screenshot,
        DeviceFolder::Inbox,
    ];

    /// The folder's name on the device, which is also its uri
    #[must_use]
    pub fn device_name(&self) -> &'static str {
        match self {
            DeviceFolder::Note => "Note",
            DeviceFolder::Document => "Document",
            DeviceFolder::Export => "EXPORT",
            DeviceFolder::MyStyle => "MyStyle",
            DeviceFolder::Screenshot => "SCREENSHOT",
            DeviceFolder::Inbox => "INBOX",
        }
    }

    /// Lowercase key used on the command line
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            DeviceFolder::Note => "note",
            DeviceFolder::Document => "document",
            DeviceFolder::Export => "export",
            DeviceFolder::MyStyle => "mystyle",
            DeviceFolder::Screenshot => "screenshot",
            DeviceFolder::Inbox => "inbox",
        }
    }

    /// Look a folder up by key or device name, case-insensitively
    ///
    /// # Errors
    /// Returns error if no folder matches
    pub fn from_key(key: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(key) || f.device_name().eq_ignore_ascii_case(key))
            .ok_or_else(|| DomainError::UnknownDestination(key.to_string()))
    }
}

impl Display for DeviceFolder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.device_name())
    }
}

// ============================================================================
// Upload allow-list
// ============================================================================

/// File extensions the device accepts for upload
pub const UPLOAD_EXTENSIONS: &[&str] = &[
    "note", "pdf", "epub", "docx", "doc", "txt", "png", "jpg", "jpeg", "bmp", "webp", "cbz",
    "fb2", "xps", "mobi",
];

/// Returns true if the file at `path` has an allow-listed extension
#[must_use]
pub fn is_uploadable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            UPLOAD_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
