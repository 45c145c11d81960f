//! Domain error types
//!
//! This module defines error types specific to domain operations:
//! uri validation, dated-folder naming and timestamp parsing.

use thiserror::Error;

use super::file_record::FileRecord;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid device uri format or content
    #[error("Invalid device uri: {0}")]
    InvalidUri(String),

    /// A folder name that is not a `YYYY-MM-DD` date
    #[error("Invalid dated folder name: {0}")]
    InvalidDatedFolder(String),

    /// The transient content buffer is empty
    #[error("File is empty: {0}")]
    EmptyBytes(String),

    /// Unknown upload destination key
    #[error("Unknown destination folder: {0}")]
    UnknownDestination(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// A modification timestamp that could not be parsed.
///
/// The record is still built, carrying the sentinel date, so the caller can
/// decide whether to warn and continue or to treat the condition as fatal.
#[derive(Debug, Error, Clone)]
#[error("Bad modification date {raw:?} for {uri}")]
pub struct BadDateError {
    /// The raw timestamp string as received
    pub raw: String,
    /// Device uri of the affected record
    pub uri: String,
    record: Box<FileRecord>,
}

impl BadDateError {
    pub(crate) fn new(raw: impl Into<String>, record: FileRecord) -> Self {
        Self {
            raw: raw.into(),
            uri: record.file_uri().as_str().to_string(),
            record: Box::new(record),
        }
    }

    /// The record built with the sentinel modification date
    pub fn record(&self) -> &FileRecord {
        &self.record
    }

    /// Recovers the sentinel-dated record
    pub fn into_record(self) -> FileRecord {
        *self.record
    }
}
