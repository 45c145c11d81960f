//! Incremental backup engine
//!
//! The [`BackupEngine`] brings today's dated folder in line with the device.
//!
//! ## Backup Flow
//!
//! 1. **Walk**: list the selected top-level folders and expand the tree
//! 2. **Reconcile**: compare with the previous snapshot (deleted, to fetch,
//!    unchanged)
//! 3. **Inspect**: in inspect mode, report the plan and stop before writing
//! 4. **Transfer**: download new/changed files, copy unchanged ones forward
//! 5. **Bookkeeping**: save the new snapshot, prune old dated folders
//!
//! No step is retried. A crash between transfers and the snapshot write
//! leaves a partially filled day folder; the next run re-downloads what the
//! old snapshot does not describe.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, instrument};

use notevault_core::domain::{DatedFolder, DeviceFolder, FileRecord};
use notevault_core::ports::{IBackupReporter, ILocalStorage, IRemoteDevice};

use crate::reconciler::{reconcile, CarryForward, Reconciliation};
use crate::retention::prune_dated_folders;
use crate::snapshot::SnapshotStore;
use crate::walker::walk_folders;
use crate::SyncError;

/// Name of the snapshot file under the save directory
pub const SNAPSHOT_FILE: &str = notevault_core::config::SNAPSHOT_FILE_NAME;

// ============================================================================
// BackupOptions
// ============================================================================

/// Parameters of one backup run
#[derive(Debug, Clone)]
pub struct BackupOptions {
    /// Root holding the dated folders and the snapshot
    pub save_dir: PathBuf,
    /// Date naming today's folder
    pub today: NaiveDate,
    /// Top-level device folders to walk
    pub folders: Vec<DeviceFolder>,
    /// Ignore the previous snapshot and download everything
    pub full_backup: bool,
    /// Report what would be done, write nothing
    pub inspect: bool,
    /// Keep only this many dated folders after the run
    pub retention_keep: Option<usize>,
}

impl BackupOptions {
    /// Options for an incremental run of every device folder, dated today
    pub fn new(save_dir: impl Into<PathBuf>) -> Self {
        Self {
            save_dir: save_dir.into(),
            today: Local::now().date_naive(),
            folders: DeviceFolder::ALL.to_vec(),
            full_backup: false,
            inspect: false,
            retention_keep: None,
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_folders(mut self, folders: Vec<DeviceFolder>) -> Self {
        self.folders = folders;
        self
    }

    pub fn full_backup(mut self, enabled: bool) -> Self {
        self.full_backup = enabled;
        self
    }

    pub fn inspect(mut self, enabled: bool) -> Self {
        self.inspect = enabled;
        self
    }

    pub fn retain(mut self, keep: Option<usize>) -> Self {
        self.retention_keep = keep;
        self
    }

    /// `<save_dir>/<today>`
    pub fn today_folder(&self) -> DatedFolder {
        DatedFolder::for_date(&self.save_dir, self.today)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.save_dir.join(SNAPSHOT_FILE)
    }

    /// Rejects options a run cannot start with
    ///
    /// # Errors
    /// [`SyncError::Config`] when the save directory or the folder list is
    /// empty.
    pub fn check(&self) -> Result<(), SyncError> {
        if self.save_dir.as_os_str().is_empty() {
            return Err(SyncError::Config("save directory is empty".into()));
        }
        if self.folders.is_empty() {
            return Err(SyncError::Config("no device folders selected".into()));
        }
        Ok(())
    }
}

/// How an unchanged file reached today's folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CarryOutcome {
    /// Copied from the previous folder, or already in place
    Copied,
    /// The previous copy was gone and the device was asked again
    Downloaded,
}

// ============================================================================
// BackupSummary
// ============================================================================

/// A file due for download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFile {
    pub uri: String,
    pub size: u64,
}

impl From<&FileRecord> for PlannedFile {
    fn from(record: &FileRecord) -> Self {
        Self {
            uri: record.file_uri().to_string(),
            size: record.file_size(),
        }
    }
}

/// Summary of a completed backup run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupSummary {
    /// Today's folder
    pub folder: PathBuf,
    /// New or changed files (downloaded, or pending in inspect mode)
    pub to_fetch: Vec<PlannedFile>,
    /// Files downloaded from the device
    pub downloaded: usize,
    /// Unchanged files carried into today's folder
    pub copied: usize,
    /// Uris recorded last time that are gone from the device
    pub deleted: Vec<String>,
    /// Dated folders removed by retention
    pub pruned: Vec<PathBuf>,
    /// Whether a new snapshot was written
    pub snapshot_saved: bool,
    /// True when nothing was written
    pub inspected: bool,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

// ============================================================================
// BackupEngine
// ============================================================================

/// Orchestrates a backup run over the device, storage and reporter ports
pub struct BackupEngine {
    device: Arc<dyn IRemoteDevice>,
    storage: Arc<dyn ILocalStorage>,
    reporter: Arc<dyn IBackupReporter>,
}

impl BackupEngine {
    pub fn new(
        device: Arc<dyn IRemoteDevice>,
        storage: Arc<dyn ILocalStorage>,
        reporter: Arc<dyn IBackupReporter>,
    ) -> Self {
        Self {
            device,
            storage,
            reporter,
        }
    }

    /// Runs one backup
    ///
    /// # Errors
    /// Any [`SyncError`] aborts the run. Files already written stay on disk;
    /// the snapshot is only replaced after every transfer succeeded.
    #[instrument(skip_all, fields(save_dir = %options.save_dir.display(), today = %options.today))]
    pub async fn run(&self, options: &BackupOptions) -> Result<BackupSummary, SyncError> {
        options.check()?;
        let started = Instant::now();
        let reporter = self.reporter.as_ref();
        let today = options.today_folder();
        info!(
            folder = %today,
            full = options.full_backup,
            inspect = options.inspect,
            "Starting backup"
        );

        let remote = walk_folders(self.device.as_ref(), &options.folders, reporter).await?;
        let mut today_set = HashSet::with_capacity(remote.len());
        for entry in remote {
            let record = FileRecord::new(today.path(), entry.uri, &entry.date, entry.size)
                .unwrap_or_else(|e| {
                    reporter.on_warning(&e.to_string());
                    e.into_record()
                });
            today_set.insert(record);
        }
        debug!(files = today_set.len(), "Device listing collected");

        let store = SnapshotStore::new(Arc::clone(&self.storage), options.snapshot_path());
        let previous: HashSet<FileRecord> = store.load(reporter).await.into_iter().collect();

        let plan = reconcile(&today_set, previous, options.full_backup);
        for record in &plan.deleted {
            reporter.on_deleted(record);
        }
        reporter.on_plan(&plan.to_fetch, &plan.unchanged_targets(), &plan.deleted);

        let mut summary = BackupSummary {
            folder: today.path().to_path_buf(),
            to_fetch: plan.to_fetch.iter().map(PlannedFile::from).collect(),
            deleted: plan.deleted.iter().map(|r| r.file_uri().to_string()).collect(),
            ..BackupSummary::default()
        };

        if options.inspect {
            info!("Inspect mode, nothing written");
            summary.inspected = true;
            summary.duration_ms = started.elapsed().as_millis() as u64;
            return Ok(summary);
        }

        summary.downloaded = self.download_all(&plan).await?;
        let (copied, downloaded_again) = self.carry_forward_all(&plan.unchanged).await?;
        summary.copied = copied;
        summary.downloaded += downloaded_again;

        if plan.is_empty() {
            info!("Nothing to record, snapshot left untouched");
        } else {
            store.save(plan.snapshot_records()).await?;
            summary.snapshot_saved = true;
        }

        if let Some(keep) = options.retention_keep {
            let pruned =
                prune_dated_folders(self.storage.as_ref(), &options.save_dir, keep, options.today)
                    .await?;
            for folder in &pruned {
                reporter.on_pruned(folder);
            }
            summary.pruned = pruned;
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            downloaded = summary.downloaded,
            copied = summary.copied,
            deleted = summary.deleted.len(),
            pruned = summary.pruned.len(),
            duration_ms = summary.duration_ms,
            "Backup complete"
        );
        Ok(summary)
    }

    async fn download_all(&self, plan: &Reconciliation) -> Result<usize, SyncError> {
        info!(count = plan.to_fetch.len(), "Downloading new files from device");
        for record in &plan.to_fetch {
            self.download(record.clone()).await?;
            self.reporter.on_downloaded(record);
        }
        Ok(plan.to_fetch.len())
    }

    /// Fetches one file and flushes it to its path under today's folder
    async fn download(&self, mut record: FileRecord) -> Result<(), SyncError> {
        let response = self.device.fetch(record.file_uri().as_str()).await?;
        record.set_file_bytes(response.into_bytes());

        let path = record.full_path();
        self.storage
            .write_file(&path, record.file_bytes())
            .await
            .map_err(|e| SyncError::io(&path, e))?;
        drop(record.take_file_bytes());
        Ok(())
    }

    /// Returns how many files were copied and how many had to be downloaded
    async fn carry_forward_all(
        &self,
        unchanged: &[CarryForward],
    ) -> Result<(usize, usize), SyncError> {
        info!(count = unchanged.len(), "Merging unchanged files from local disk");
        let (mut copied, mut downloaded) = (0, 0);
        for carry in unchanged {
            match self.carry_forward(carry).await? {
                CarryOutcome::Copied => {
                    copied += 1;
                    self.reporter.on_copied(&carry.target);
                }
                CarryOutcome::Downloaded => {
                    downloaded += 1;
                    self.reporter.on_downloaded(&carry.target);
                }
            }
        }
        Ok((copied, downloaded))
    }

    /// Copies an unchanged file from its previous folder into today's
    ///
    /// When the previous copy is gone from disk the file is downloaded again.
    async fn carry_forward(&self, carry: &CarryForward) -> Result<CarryOutcome, SyncError> {
        let source = carry.source_path();
        let present = self
            .storage
            .exists(&source)
            .await
            .map_err(|e| SyncError::io(&source, e))?;

        if !present {
            self.reporter.on_warning(&format!(
                "Previous copy {} is missing, downloading {} again",
                source.display(),
                carry.target.file_uri()
            ));
            self.download(carry.target.clone()).await?;
            return Ok(CarryOutcome::Downloaded);
        }
        if !carry.needs_copy() {
            return Ok(CarryOutcome::Copied);
        }

        let bytes = self
            .storage
            .read_file(&source)
            .await
            .map_err(|e| SyncError::io(&source, e))?;
        let target = carry.target_path();
        self.storage
            .write_file(&target, &bytes)
            .await
            .map_err(|e| SyncError::io(&target, e))?;
        Ok(CarryOutcome::Copied)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
