//! CLI subcommands and the helpers they share

pub mod backup;
pub mod setup;
pub mod upload;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notevault_core::config::Config;

use crate::output::OutputFormat;

/// Options accepted before or after any subcommand
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub format: OutputFormat,
    pub config: Option<PathBuf>,
    pub verbose: u8,
}

/// Picks the config file: `-c`, else `./config.json` if present, else the
/// per-user default
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let local = cwd.join("config.json");
    if local.is_file() {
        local
    } else {
        Config::default_path()
    }
}

/// Loads, overrides and validates the configuration
///
/// Any problem here is fatal before the device is contacted.
pub fn load_config(global: &GlobalArgs, url_override: Option<&str>) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let path = resolve_config_path(global.config.as_deref(), &cwd);
    let mut config = Config::load(&path)?;

    if let Some(url) = url_override {
        config.device_url = url.to_string();
    }

    let errors = config.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!(
            "Invalid configuration in {}: {}",
            path.display(),
            details.join("; ")
        );
    }
    Ok(config)
}

/// Creates `dir` if needed and proves a file can be written inside it
pub fn ensure_writable(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Unable to create save directory {}", dir.display()))?;
    let probe = dir.join(".notevault-write-test");
    std::fs::write(&probe, b"")
        .with_context(|| format!("Save directory {} is not writable", dir.display()))?;
    std::fs::remove_file(&probe)
        .with_context(|| format!("Unable to clean up {}", probe.display()))?;
    Ok(())
}
