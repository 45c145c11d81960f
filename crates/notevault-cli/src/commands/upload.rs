//! Upload command - Send local files to a device folder

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use notevault_core::domain::DeviceFolder;
use notevault_device::{DeviceClient, HttpRemoteDevice};
use notevault_sync::filesystem::LocalStorageAdapter;
use notevault_sync::reporter::TracingReporter;
use notevault_sync::upload::upload_files;

use super::{load_config, GlobalArgs};
use crate::logging;
use crate::output::{get_formatter, plural};

fn parse_destination(value: &str) -> Result<DeviceFolder, String> {
    DeviceFolder::from_key(value).map_err(|e| e.to_string())
}

#[derive(Debug, Args)]
pub struct UploadCommand {
    /// Device folder: note, document, export, mystyle, screenshot or inbox
    #[arg(short, long, default_value = "document", value_parser = parse_destination)]
    pub destination: DeviceFolder,

    /// Override the device url found in the config file
    #[arg(short, long)]
    pub url: Option<String>,

    /// Files to send
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl UploadCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let formatter = get_formatter(global.format.is_json());

        let config = load_config(global, self.url.as_deref())?;
        logging::init(global.verbose, &config.logging.level, Some(&config.log_file()))?;

        let client = DeviceClient::new(
            &config.device_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        let device = HttpRemoteDevice::new(client);

        let summary = upload_files(
            &device,
            &LocalStorageAdapter::new(),
            self.destination,
            &self.files,
            &TracingReporter::new(),
        )
        .await
        .context("Upload failed")?;

        if global.format.is_json() {
            formatter.print_json(&serde_json::to_value(&summary)?);
            return Ok(());
        }

        formatter.success(&format!(
            "Uploaded {} to {}",
            plural(summary.uploaded.len(), "file"),
            summary.destination
        ));
        for name in &summary.uploaded {
            formatter.item(name);
        }
        for path in &summary.skipped {
            formatter.warn(&format!(
                "{} skipped: file type not accepted by the device",
                path.display()
            ));
        }
        Ok(())
    }
}
