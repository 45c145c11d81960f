//! Configuration module for notevault.
//!
//! Provides typed configuration structs that map to the JSON configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::newtypes::DeviceFolder;

/// Name of the snapshot file kept in the save directory.
pub const SNAPSHOT_FILE_NAME: &str = "metadata.json";

/// Name of the log file kept in the save directory.
pub const LOG_FILE_NAME: &str = "notevault.log";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for notevault.
///
/// `save_dir` and `device_url` are required; every other key has a default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory holding the dated backup folders and the snapshot.
    pub save_dir: PathBuf,
    /// Base url of the device's browsable listing, e.g. `http://192.168.1.105:8089/`.
    pub device_url: String,
    /// Top-level device folders to back up (device names).
    #[serde(default = "default_folders")]
    pub folders: Vec<String>,
    /// Connect/read timeout for each device request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dated folder retention settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Whether old dated folders are deleted after a backup.
    pub enabled: bool,
    /// Number of most recent dated folders to keep.
    pub keep: usize,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Path to the log file. Defaults to `<save_dir>/notevault.log`.
    pub file: Option<PathBuf>,
}

fn default_folders() -> Vec<String> {
    DeviceFolder::ALL
        .iter()
        .map(|f| f.device_name().to_string())
        .collect()
}

fn default_timeout_secs() -> u64 {
    1
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                anyhow::bail!("JSON config file not found at {}", path.display())
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read config file {}", path.display()))
            }
        };

        let config: Config = serde_json::from_str(&content).with_context(|| {
            format!(
                "JSON config malformed or invalid. Check your config at {}",
                path.display()
            )
        })?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/notevault/config.json` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("notevault")
            .join("config.json")
    }

    /// Location of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.save_dir.join(SNAPSHOT_FILE_NAME)
    }

    /// Location of the log file.
    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| self.save_dir.join(LOG_FILE_NAME))
    }

    /// The configured folders, resolved against the device's folder table.
    ///
    /// Unknown names are dropped; [`Config::validate`] reports them.
    pub fn device_folders(&self) -> Vec<DeviceFolder> {
        self.folders
            .iter()
            .filter_map(|name| DeviceFolder::from_key(name).ok())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            save_dir: dirs::document_dir()
                .unwrap_or_else(|| PathBuf::from("~/Documents"))
                .join("notevault"),
            device_url: String::new(),
            folders: default_folders(),
            timeout_secs: default_timeout_secs(),
            retention: RetentionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            keep: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"retention.keep"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- save_dir ---
        if self.save_dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "save_dir".into(),
                message: "must not be empty".into(),
            });
        }

        // --- device_url ---
        match url::Url::parse(&self.device_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            Ok(url) => errors.push(ValidationError {
                field: "device_url".into(),
                message: format!("unsupported url '{}'; expected http(s)://host:port/", url),
            }),
            Err(e) => errors.push(ValidationError {
                field: "device_url".into(),
                message: format!("invalid url '{}': {e}", self.device_url),
            }),
        }

        // --- folders ---
        if self.folders.is_empty() {
            errors.push(ValidationError {
                field: "folders".into(),
                message: "must list at least one device folder".into(),
            });
        }
        for name in &self.folders {
            if DeviceFolder::from_key(name).is_err() {
                errors.push(ValidationError {
                    field: "folders".into(),
                    message: format!("unknown device folder '{name}'"),
                });
            }
        }

        // --- timeout ---
        if self.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- retention ---
        if self.retention.enabled && self.retention.keep == 0 {
            errors.push(ValidationError {
                field: "retention.keep".into(),
                message: "must be greater than 0 when retention is enabled".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use notevault_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .save_dir(PathBuf::from("/home/user/Notes"))
///     .device_url("http://192.168.1.105:8089/")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn save_dir(mut self, save_dir: PathBuf) -> Self {
        self.config.save_dir = save_dir;
        self
    }

    pub fn device_url(mut self, url: impl Into<String>) -> Self {
        self.config.device_url = url.into();
        self
    }

    pub fn folders(mut self, folders: &[DeviceFolder]) -> Self {
        self.config.folders = folders
            .iter()
            .map(|f| f.device_name().to_string())
            .collect();
        self
    }

    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.config.timeout_secs = seconds;
        self
    }

    pub fn retention(mut self, enabled: bool, keep: usize) -> Self {
        self.config.retention = RetentionConfig { enabled, keep };
        self
    }

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_file(mut self, file: PathBuf) -> Self {
        self.config.logging.file = Some(file);
        self
    }

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
