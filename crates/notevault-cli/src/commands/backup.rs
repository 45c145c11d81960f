//! Backup command - Copy the device into today's dated folder
//!
//! Provides the `notevault backup` CLI command which:
//! 1. Loads and validates configuration, checks the save directory
//! 2. Starts logging to the console and the save directory's log file
//! 3. Creates the adapters (HTTP device, local storage, tracing reporter)
//! 4. Runs the BackupEngine and displays the results

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use notevault_core::config::Config;
use notevault_core::domain::DeviceFolder;
use notevault_device::{DeviceClient, HttpRemoteDevice};
use notevault_sync::engine::{BackupEngine, BackupOptions, BackupSummary};
use notevault_sync::filesystem::LocalStorageAdapter;
use notevault_sync::reporter::TracingReporter;

use super::{ensure_writable, load_config, GlobalArgs};
use crate::logging;
use crate::output::{format_duration, format_size, get_formatter, plural, OutputFormatter};

/// Dated folders kept by `--cleanup` without a value
const DEFAULT_CLEANUP_KEEP: &str = "10";

#[derive(Debug, Args)]
pub struct BackupCommand {
    /// Download everything again, ignoring the previous snapshot
    #[arg(short, long)]
    pub full: bool,

    /// Show new and updated files without downloading anything
    #[arg(short, long)]
    pub inspect: bool,

    /// Override the device url found in the config file
    #[arg(short, long)]
    pub url: Option<String>,

    /// Back up only the Note folder
    #[arg(long)]
    pub notes: bool,

    /// Keep only the newest KEEP dated folders after the backup
    #[arg(long, value_name = "KEEP", num_args = 0..=1, default_missing_value = DEFAULT_CLEANUP_KEEP)]
    pub cleanup: Option<usize>,
}

impl BackupCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> Result<()> {
        let formatter = get_formatter(global.format.is_json());

        let config = load_config(global, self.url.as_deref())?;
        ensure_writable(&config.save_dir)?;
        logging::init(
            global.verbose,
            &config.logging.level,
            Some(&config.log_file()),
        )?;

        info!(device = %config.device_url, save_dir = %config.save_dir.display(), "Configuration loaded");

        let client = DeviceClient::new(
            &config.device_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        let engine = BackupEngine::new(
            Arc::new(HttpRemoteDevice::new(client)),
            Arc::new(LocalStorageAdapter::new()),
            Arc::new(TracingReporter::new()),
        );

        let options = self.options(&config);
        if !global.format.is_json() {
            formatter.info(&format!(
                "Backing up {} to {}",
                config.device_url,
                options.today_folder()
            ));
        }

        let summary = engine.run(&options).await.context("Backup failed")?;

        if global.format.is_json() {
            formatter.print_json(&serde_json::to_value(&summary)?);
        } else {
            print_summary(formatter.as_ref(), &summary);
        }
        Ok(())
    }

    /// Engine options from the flags, falling back to the config file
    fn options(&self, config: &Config) -> BackupOptions {
        let folders = if self.notes {
            vec![DeviceFolder::Note]
        } else {
            config.device_folders()
        };
        let keep = self
            .cleanup
            .or_else(|| config.retention.enabled.then_some(config.retention.keep));

        BackupOptions::new(&config.save_dir)
            .with_folders(folders)
            .full_backup(self.full)
            .inspect(self.inspect)
            .retain(keep)
    }
}

fn print_summary(formatter: &dyn OutputFormatter, summary: &BackupSummary) {
    if summary.inspected {
        formatter.success(&format!(
            "{} to download",
            plural(summary.to_fetch.len(), "new or updated file")
        ));
        for file in &summary.to_fetch {
            formatter.item(&format!("{} ({})", file.uri, format_size(file.size)));
        }
    } else if summary.downloaded == 0 && summary.deleted.is_empty() {
        formatter.success(&format!(
            "Already up to date ({} carried forward)",
            plural(summary.copied, "file")
        ));
    } else {
        formatter.success(&format!(
            "Backup saved to {}",
            summary.folder.display()
        ));
        formatter.info(&format!("Downloaded: {}", plural(summary.downloaded, "file")));
        formatter.info(&format!("Unchanged:  {}", plural(summary.copied, "file")));
    }

    if !summary.deleted.is_empty() {
        formatter.info(&format!(
            "No longer on device: {}",
            plural(summary.deleted.len(), "file")
        ));
        for uri in &summary.deleted {
            formatter.item(uri);
        }
    }
    for folder in &summary.pruned {
        formatter.info(&format!("Removed old backup {}", folder.display()));
    }
    formatter.info(&format!("Exec time: {}", format_duration(summary.duration_ms)));
}
