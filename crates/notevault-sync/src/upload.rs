//! Upload of local files into a device folder
//!
//! Files whose extension the device does not accept are skipped and
//! reported; they never fail the run.

use std::path::{Path, PathBuf};

use notevault_core::domain::{is_uploadable, DeviceFolder};
use notevault_core::ports::{IBackupReporter, ILocalStorage, IRemoteDevice};
use serde::Serialize;
use tracing::{info, instrument};

use crate::SyncError;

/// What an upload run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    /// Destination folder on the device
    pub destination: String,
    /// File names sent
    pub uploaded: Vec<String>,
    /// Local paths not sent because of their extension
    pub skipped: Vec<PathBuf>,
}

/// Sends each accepted file in `paths` to `destination`
///
/// # Errors
/// A local file that cannot be read is [`SyncError::Io`]; device failures
/// map through [`SyncError::from`]. Files sent before the failure stay sent.
#[instrument(skip(device, storage, reporter, paths), fields(destination = %destination, files = paths.len()))]
pub async fn upload_files(
    device: &dyn IRemoteDevice,
    storage: &dyn ILocalStorage,
    destination: DeviceFolder,
    paths: &[PathBuf],
    reporter: &dyn IBackupReporter,
) -> Result<UploadSummary, SyncError> {
    let mut summary = UploadSummary {
        destination: destination.device_name().to_string(),
        ..UploadSummary::default()
    };

    for path in paths {
        if !is_uploadable(path) {
            reporter.on_skipped_upload(path);
            summary.skipped.push(path.clone());
            continue;
        }

        let filename = file_name(path)?;
        let data = storage
            .read_file(path)
            .await
            .map_err(|e| SyncError::io(path, e))?;

        device
            .upload(destination.device_name(), &filename, data)
            .await?;
        info!(file = %filename, "Uploaded");
        reporter.on_uploaded(&filename);
        summary.uploaded.push(filename);
    }

    Ok(summary)
}

fn file_name(path: &Path) -> Result<String, SyncError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| SyncError::io(path, anyhow::anyhow!("path has no file name")))
}
