//! notevault Sync - Incremental backup engine
//!
//! Provides:
//! - Depth-first expansion of the device's directory listings
//! - Snapshot persistence of the previous run
//! - Set-based reconciliation (to fetch, unchanged, deleted)
//! - Download and copy-forward into today's dated folder
//! - Retention of dated folders and uploads back to the device
//!
//! ## Modules
//!
//! - [`engine`] - Backup engine orchestrating a full run
//! - [`filesystem`] - Local storage adapter (durable writes)
//! - [`listing`] - Parser for the device's embedded JSON listings
//! - [`reconciler`] - Set algebra over file identities
//! - [`reporter`] - `tracing`-backed reporter
//! - [`retention`] - Dated folder pruning
//! - [`snapshot`] - Snapshot load/save
//! - [`upload`] - Local files to the device
//! - [`walker`] - Remote tree walker

pub mod engine;
pub mod filesystem;
pub mod listing;
pub mod reconciler;
pub mod reporter;
pub mod retention;
pub mod snapshot;
pub mod upload;
pub mod walker;

#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};

use notevault_core::ports::DeviceError;
use thiserror::Error;

/// Errors that abort a backup or upload run
#[derive(Debug, Error)]
pub enum SyncError {
    /// The device could not be reached at all
    #[error("Unable to reach device: {0}")]
    Unreachable(DeviceError),

    /// A listing page did not have the expected shape
    #[error("Unexpected listing for {uri:?}: {reason}")]
    Protocol {
        /// Uri of the listing page
        uri: String,
        /// What was wrong with it
        reason: String,
    },

    /// The device answered a file request with an error
    #[error("Device error: {0}")]
    Device(DeviceError),

    /// A local read or write failed
    #[error("IO error at {}: {cause:#}", .path.display())]
    Io {
        /// The path being read or written
        path: PathBuf,
        /// Underlying storage error
        cause: anyhow::Error,
    },

    /// The snapshot could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The run was requested with unusable options
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Wraps a storage failure with the path it concerned
    pub fn io(path: &Path, cause: anyhow::Error) -> Self {
        SyncError::Io {
            path: path.to_path_buf(),
            cause,
        }
    }
}

impl From<DeviceError> for SyncError {
    fn from(err: DeviceError) -> Self {
        if err.is_unreachable() {
            SyncError::Unreachable(err)
        } else {
            SyncError::Device(err)
        }
    }
}
