//! In-memory doubles shared by the unit tests of this crate

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use notevault_core::domain::FileRecord;
use notevault_core::ports::{DeviceError, FetchResponse, IBackupReporter, IRemoteDevice};

use crate::listing::render_listing;

/// Device double serving canned listings and files
#[derive(Default)]
pub(crate) struct FakeDevice {
    responses: Mutex<HashMap<String, Result<FetchResponse, DeviceError>>>,
    fetched: Mutex<Vec<String>>,
    uploads: Mutex<Vec<(String, String, Vec<u8>)>>,
    unreachable: bool,
}

impl FakeDevice {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A device whose every request fails to connect
    pub(crate) fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Serves a listing page for directory `uri`
    pub(crate) fn listing(&self, uri: &str, file_list: serde_json::Value) {
        self.respond(uri, Ok(FetchResponse::new(200, render_listing(file_list))));
    }

    /// Serves raw content at `uri`
    pub(crate) fn file(&self, uri: &str, content: &[u8]) {
        self.respond(uri, Ok(FetchResponse::new(200, content.to_vec())));
    }

    pub(crate) fn respond(&self, uri: &str, response: Result<FetchResponse, DeviceError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(uri.to_string(), response);
    }

    /// Every uri fetched so far, in order
    pub(crate) fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    pub(crate) fn uploads(&self) -> Vec<(String, String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl IRemoteDevice for FakeDevice {
    async fn fetch(&self, uri: &str) -> Result<FetchResponse, DeviceError> {
        self.fetched.lock().unwrap().push(uri.to_string());
        if self.unreachable {
            return Err(DeviceError::Unreachable {
                url: format!("http://127.0.0.1:1/{uri}"),
                reason: "connection refused".into(),
            });
        }
        self.responses
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .unwrap_or(Err(DeviceError::Status {
                uri: uri.to_string(),
                status: 404,
            }))
    }

    async fn upload(
        &self,
        destination_uri: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<FetchResponse, DeviceError> {
        if self.unreachable {
            return Err(DeviceError::Unreachable {
                url: format!("http://127.0.0.1:1/{destination_uri}"),
                reason: "connection refused".into(),
            });
        }
        self.uploads.lock().unwrap().push((
            destination_uri.to_string(),
            filename.to_string(),
            data,
        ));
        Ok(FetchResponse::new(200, "ok"))
    }
}

/// Reporter that records every event as a short string
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub(crate) fn warnings(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("warning: ").map(str::to_string))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl IBackupReporter for RecordingReporter {
    fn on_plan(&self, to_fetch: &[FileRecord], unchanged: &[FileRecord], deleted: &[FileRecord]) {
        self.push(format!(
            "plan: fetch={} unchanged={} deleted={}",
            to_fetch.len(),
            unchanged.len(),
            deleted.len()
        ));
    }

    fn on_downloaded(&self, record: &FileRecord) {
        self.push(format!("downloaded: {}", record.file_uri()));
    }

    fn on_copied(&self, record: &FileRecord) {
        self.push(format!("copied: {}", record.file_uri()));
    }

    fn on_deleted(&self, record: &FileRecord) {
        self.push(format!("deleted: {}", record.file_uri()));
    }

    fn on_pruned(&self, folder: &Path) {
        self.push(format!("pruned: {}", folder.display()));
    }

    fn on_uploaded(&self, filename: &str) {
        self.push(format!("uploaded: {filename}"));
    }

    fn on_skipped_upload(&self, path: &Path) {
        self.push(format!("skipped: {}", path.display()));
    }

    fn on_warning(&self, message: &str) {
        self.push(format!("warning: {message}"));
    }
}

/// A folder path that exists only as a value
pub(crate) fn day(save_dir: &Path, date: &str) -> PathBuf {
    save_dir.join(date)
}
