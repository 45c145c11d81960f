//! `tracing`-backed implementation of [`IBackupReporter`]

use std::path::Path;

use notevault_core::domain::FileRecord;
use notevault_core::ports::IBackupReporter;
use tracing::{debug, info, warn};

/// Bytes per megabyte, for human-readable sizes
const MB: f64 = 1_000_000.0;

/// Turns every engine event into a `tracing` event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn new() -> Self {
        Self
    }
}

impl IBackupReporter for TracingReporter {
    fn on_plan(&self, to_fetch: &[FileRecord], unchanged: &[FileRecord], deleted: &[FileRecord]) {
        info!(
            to_fetch = to_fetch.len(),
            unchanged = unchanged.len(),
            deleted = deleted.len(),
            "Reconciled device listing with previous snapshot"
        );
        for record in to_fetch {
            debug!(
                uri = %record.file_uri(),
                size_mb = %format!("{:.2}", record.file_size() as f64 / MB),
                "New or updated"
            );
        }
    }

    fn on_downloaded(&self, record: &FileRecord) {
        info!(uri = %record.file_uri(), path = %record.full_path().display(), "Downloaded");
    }

    fn on_copied(&self, record: &FileRecord) {
        debug!(uri = %record.file_uri(), path = %record.full_path().display(), "Copied forward");
    }

    fn on_deleted(&self, record: &FileRecord) {
        info!(uri = %record.file_uri(), last_saved = %record.save_date(), "No longer on device");
    }

    fn on_pruned(&self, folder: &Path) {
        info!(folder = %folder.display(), "Removed old backup folder");
    }

    fn on_uploaded(&self, filename: &str) {
        info!(file = filename, "Uploaded to device");
    }

    fn on_skipped_upload(&self, path: &Path) {
        warn!(path = %path.display(), "Extension not accepted by the device, skipped");
    }

    fn on_warning(&self, message: &str) {
        warn!("{message}");
    }
}
