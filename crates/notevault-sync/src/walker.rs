//! Remote tree walker
//!
//! Expands directory listings into a flat, depth-first list of leaf files.
//! Directories are expanded from an explicit stack, one fetch each; leaf
//! files are never fetched here.
//!
//! Failure policy per directory:
//! - device unreachable: fatal
//! - page without the embedded listing: fatal (the tree cannot be known)
//! - error status or undecodable listing: the directory counts as empty

use notevault_core::domain::{DeviceFolder, FileUri};
use notevault_core::ports::{DeviceError, IBackupReporter, IRemoteDevice};
use tracing::{debug, instrument};

use crate::listing::{parse_listing, ListingEntry, ListingError};
use crate::SyncError;

/// A leaf file found on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub uri: FileUri,
    /// Raw modification time as listed
    pub date: String,
    pub size: u64,
}

/// Fetches and parses the listing of one directory
///
/// # Errors
/// [`SyncError::Unreachable`] if the device cannot be reached,
/// [`SyncError::Protocol`] if the page carries no listing, and
/// [`SyncError::Device`] if the body cannot be read.
pub async fn fetch_listing(
    device: &dyn IRemoteDevice,
    uri: &str,
    reporter: &dyn IBackupReporter,
) -> Result<Vec<ListingEntry>, SyncError> {
    let response = match device.fetch(uri).await {
        Ok(response) => response,
        Err(DeviceError::Status { status, .. }) => {
            reporter.on_warning(&format!(
                "{uri:?} not found on device (status {status}), treating as empty"
            ));
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    match parse_listing(&response.text()) {
        Ok(entries) => {
            debug!(uri, count = entries.len(), "Listing parsed");
            Ok(entries)
        }
        Err(ListingError::MissingMarker) => Err(SyncError::Protocol {
            uri: uri.to_string(),
            reason: ListingError::MissingMarker.to_string(),
        }),
        Err(e @ ListingError::Malformed(_)) => {
            reporter.on_warning(&format!("{uri:?}: {e}, treating as empty"));
            Ok(Vec::new())
        }
    }
}

/// Walks every entry of `roots`, descending into directories
///
/// Leaves come out in depth-first pre-order, matching the order the device
/// lists them.
///
/// # Errors
/// Propagates the fatal errors of [`fetch_listing`].
#[instrument(skip_all, fields(roots = roots.len()))]
pub async fn walk_remote_tree(
    device: &dyn IRemoteDevice,
    roots: Vec<ListingEntry>,
    reporter: &dyn IBackupReporter,
) -> Result<Vec<RemoteEntry>, SyncError> {
    let mut files = Vec::new();
    let mut directories = 0usize;
    let mut pending: Vec<ListingEntry> = roots.into_iter().rev().collect();

    while let Some(entry) = pending.pop() {
        let Some(raw_uri) = entry.uri.as_deref() else {
            reporter.on_warning(&format!(
                "Listing entry {:?} has no uri, skipped",
                entry.name.as_deref().unwrap_or("<unnamed>")
            ));
            continue;
        };
        let uri = match FileUri::new(raw_uri) {
            Ok(uri) => uri,
            Err(e) => {
                reporter.on_warning(&format!("{e}, skipped"));
                continue;
            }
        };

        if entry.is_directory {
            directories += 1;
            let children = fetch_listing(device, uri.as_str(), reporter).await?;
            pending.extend(children.into_iter().rev());
        } else {
            files.push(RemoteEntry {
                uri,
                date: entry.date.unwrap_or_default(),
                size: entry.size,
            });
        }
    }

    debug!(files = files.len(), directories, "Remote tree walked");
    Ok(files)
}

/// Lists each top-level device folder and walks everything below it
///
/// # Errors
/// Propagates the fatal errors of [`fetch_listing`].
pub async fn walk_folders(
    device: &dyn IRemoteDevice,
    folders: &[DeviceFolder],
    reporter: &dyn IBackupReporter,
) -> Result<Vec<RemoteEntry>, SyncError> {
    let mut roots = Vec::new();
    for folder in folders {
        roots.extend(fetch_listing(device, folder.device_name(), reporter).await?);
    }
    walk_remote_tree(device, roots, reporter).await
}

#[cfg(test)]
mod tests {
    use notevault_core::ports::FetchResponse;
    use serde_json::json;

    use super::*;
    use crate::testing::{FakeDevice, RecordingReporter};

    fn file(uri: &str, date: &str, size: u64) -> serde_json::Value {
        json!({ "uri": uri, "date": date, "size": size, "isDirectory": false,
                "name": uri.rsplit('/').next(), "extension": "note" })
    }

    fn dir(uri: &str) -> serde_json::Value {
        json!({ "uri": uri, "date": "2024-01-01 00:00", "size": 0, "isDirectory": true,
                "name": uri.rsplit('/').next(), "extension": "" })
    }

    fn uris(entries: &[RemoteEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.uri.as_str()).collect()
    }

    #[tokio::test]
    async fn test_walk_is_depth_first_with_one_fetch_per_directory() {
        let device = FakeDevice::new();
        let reporter = RecordingReporter::default();
        device.listing(
            "Note",
            json!([
                file("/Note/a.note", "2024-03-01 10:00", 10),
                dir("/Note/Work"),
                file("/Note/z.note", "2024-03-02 10:00", 30),
            ]),
        );
        device.listing(
            "Note/Work",
            json!([dir("/Note/Work/Deep"), file("/Note/Work/b.note", "2024-03-01 11:00", 20)]),
        );
        device.listing(
            "Note/Work/Deep",
            json!([file("/Note/Work/Deep/c.note", "2024-03-01 12:00", 5)]),
        );

        let files = walk_folders(&device, &[DeviceFolder::Note], &reporter)
            .await
            .unwrap();

        assert_eq!(
            uris(&files),
            vec![
                "Note/a.note",
                "Note/Work/Deep/c.note",
                "Note/Work/b.note",
                "Note/z.note"
            ]
        );
        assert_eq!(files[0].date, "2024-03-01 10:00");
        assert_eq!(files[0].size, 10);
        assert_eq!(device.fetched(), vec!["Note", "Note/Work", "Note/Work/Deep"]);
        assert!(reporter.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_walk_strips_leading_separator() {
        let device = FakeDevice::new();
        let reporter = RecordingReporter::default();
        let roots = vec![ListingEntry {
            uri: Some("/EXPORT/page.png".into()),
            date: Some("2024-03-01 10:00".into()),
            size: 7,
            ..ListingEntry::default()
        }];

        let files = walk_remote_tree(&device, roots, &reporter).await.unwrap();
        assert_eq!(uris(&files), vec!["EXPORT/page.png"]);
        assert!(device.fetched().is_empty());
    }

    #[tokio::test]
    async fn test_entries_without_uri_are_skipped_with_warning() {
        let device = FakeDevice::new();
        let reporter = RecordingReporter::default();
        device.listing(
            "Note",
            json!([{ "name": "ghost", "isDirectory": false }, file("/Note/a.note", "2024-03-01 10:00", 1)]),
        );

        let files = walk_folders(&device, &[DeviceFolder::Note], &reporter)
            .await
            .unwrap();
        assert_eq!(uris(&files), vec!["Note/a.note"]);
        assert_eq!(reporter.warnings().len(), 1);
        assert!(reporter.warnings()[0].contains("ghost"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_empty() {
        let device = FakeDevice::new();
        let reporter = RecordingReporter::default();
        device.listing("Note", json!([dir("/Note/Gone"), file("/Note/a.note", "2024-03-01 10:00", 1)]));
        device.respond(
            "Note/Gone",
            Err(DeviceError::Status {
                uri: "Note/Gone".into(),
                status: 301,
            }),
        );

        let files = walk_folders(&device, &[DeviceFolder::Note], &reporter)
            .await
            .unwrap();
        assert_eq!(uris(&files), vec!["Note/a.note"]);
        assert!(reporter.warnings()[0].contains("not found"));
    }

    #[tokio::test]
    async fn test_malformed_listing_is_empty() {
        let device = FakeDevice::new();
        let reporter = RecordingReporter::default();
        device.listing("Note", json!([dir("/Note/Broken")]));
        device.respond(
            "Note/Broken",
            Ok(FetchResponse::new(200, "<script>const json = '{\"fileList\": [}'</script>")),
        );

        let files = walk_folders(&device, &[DeviceFolder::Note], &reporter)
            .await
            .unwrap();
        assert!(files.is_empty());
        assert_eq!(reporter.warnings().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_marker_is_fatal() {
        let device = FakeDevice::new();
        let reporter = RecordingReporter::default();
        device.respond("Note", Ok(FetchResponse::new(200, "<html>login</html>")));

        let err = walk_folders(&device, &[DeviceFolder::Note], &reporter)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Protocol { ref uri, .. } if uri == "Note"));
    }

    #[tokio::test]
    async fn test_unreachable_is_fatal() {
        let device = FakeDevice::unreachable();
        let reporter = RecordingReporter::default();

        let err = walk_folders(&device, &[DeviceFolder::Note], &reporter)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Unreachable(_)));
    }

    #[tokio::test]
    async fn test_walk_multiple_folders_in_order() {
        let device = FakeDevice::new();
        let reporter = RecordingReporter::default();
        device.listing("Note", json!([file("/Note/a.note", "2024-03-01 10:00", 1)]));
        device.listing("EXPORT", json!([file("/EXPORT/a.pdf", "2024-03-01 10:00", 2)]));

        let files = walk_folders(
            &device,
            &[DeviceFolder::Note, DeviceFolder::Export],
            &reporter,
        )
        .await
        .unwrap();
        assert_eq!(uris(&files), vec!["Note/a.note", "EXPORT/a.pdf"]);
    }
}
