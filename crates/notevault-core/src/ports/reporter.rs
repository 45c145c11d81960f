//! Backup reporter port (driven/secondary port)
//!
//! The engine reports what it does through this interface instead of a
//! process-wide logger, so reconciliation and execution can be tested
//! without a live subscriber. The CLI plugs in a tracing-backed adapter.
//!
//! ## Design Notes
//!
//! - Callbacks are synchronous and fire-and-forget.
//! - Implementations must be thread-safe; the engine holds the reporter
//!   behind an `Arc`.

use std::path::Path;

use crate::domain::file_record::FileRecord;

/// Port trait for progress and outcome reporting
pub trait IBackupReporter: Send + Sync {
    /// The reconciliation result, before any file is written
    fn on_plan(&self, to_fetch: &[FileRecord], unchanged: &[FileRecord], deleted: &[FileRecord]);

    /// A new or changed file was downloaded into today's folder
    fn on_downloaded(&self, record: &FileRecord);

    /// An unchanged file was copied forward into today's folder
    fn on_copied(&self, record: &FileRecord);

    /// A previously recorded file is no longer on the device
    fn on_deleted(&self, record: &FileRecord);

    /// A dated backup folder was removed by retention
    fn on_pruned(&self, folder: &Path);

    /// A local file was sent to the device
    fn on_uploaded(&self, filename: &str);

    /// A local file was not uploaded because its extension is not accepted
    fn on_skipped_upload(&self, path: &Path);

    /// A recoverable problem (bad listing, bad timestamp, unreadable snapshot)
    fn on_warning(&self, message: &str);
}

/// Reporter that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl IBackupReporter for NullReporter {
    fn on_plan(&self, _: &[FileRecord], _: &[FileRecord], _: &[FileRecord]) {}
    fn on_downloaded(&self, _: &FileRecord) {}
    fn on_copied(&self, _: &FileRecord) {}
    fn on_deleted(&self, _: &FileRecord) {}
    fn on_pruned(&self, _: &Path) {}
    fn on_uploaded(&self, _: &str) {}
    fn on_skipped_upload(&self, _: &Path) {}
    fn on_warning(&self, _: &str) {}
}
