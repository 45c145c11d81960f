//! Setup command - Create the config file interactively
//!
//! Asks for the save directory, the device's IPv4 address and port, shows
//! the result for confirmation, then writes the config file.

use std::io::{self, BufRead, Write};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use notevault_core::config::{Config, ConfigBuilder};

use super::{ensure_writable, GlobalArgs};
use crate::logging;
use crate::output::get_formatter;

/// Port the device's browse-and-access server listens on
pub const DEFAULT_PORT: u16 = 8089;

#[derive(Debug, Args)]
pub struct SetupCommand {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// What the user entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupAnswers {
    pub save_dir: PathBuf,
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl SetupAnswers {
    pub fn device_url(&self) -> String {
        format!("http://{}:{}/", self.ip, self.port)
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read input")?;
    Ok(line.trim().to_string())
}

/// Runs the prompts; `None` means the user declined at confirmation
pub fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    default_save_dir: &Path,
) -> Result<Option<SetupAnswers>> {
    writeln!(output, "Where do you want to save your backups?")?;
    writeln!(output, "Default location is {}", default_save_dir.display())?;
    let save = read_answer(input)?;
    let save_dir = if save.is_empty() {
        default_save_dir.to_path_buf()
    } else {
        PathBuf::from(save)
    };

    writeln!(output, "Connect to Wi-Fi and enable browse and access on your device.")?;
    writeln!(output, "Enter the IP address of your device, for example 192.168.1.105")?;
    let raw_ip = read_answer(input)?;
    let ip: Ipv4Addr = raw_ip.parse().map_err(|_| {
        anyhow::anyhow!(
            "Invalid IPv4 address: {raw_ip:?}. Restart setup with `notevault setup`"
        )
    })?;

    writeln!(output, "Enter the device port number. Default is port {DEFAULT_PORT}")?;
    let raw_port = read_answer(input)?;
    let port = if raw_port.is_empty() {
        DEFAULT_PORT
    } else {
        raw_port
            .parse()
            .with_context(|| format!("Invalid port number: {raw_port:?}"))?
    };

    let answers = SetupAnswers { save_dir, ip, port };
    writeln!(output, "Backing up files to {}", answers.save_dir.display())?;
    writeln!(output, "Device URL is {}", answers.device_url())?;
    write!(output, "Press Y to confirm or N to cancel: ")?;
    output.flush()?;

    if read_answer(input)?.eq_ignore_ascii_case("y") {
        Ok(Some(answers))
    } else {
        Ok(None)
    }
}

impl SetupCommand {
    pub async fn execute(&self, global: &GlobalArgs) -> Result<()> {
        logging::init(global.verbose, "warn", None)?;
        let formatter = get_formatter(global.format.is_json());

        let path = global.config.clone().unwrap_or_else(Config::default_path);
        if path.exists() && !self.force {
            anyhow::bail!(
                "Config file already exists at {}; rerun with --force to replace it",
                path.display()
            );
        }

        let default_save_dir = Config::default().save_dir;
        let answers = {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            prompt(&mut input, &mut output, &default_save_dir)?
        };
        let Some(answers) = answers else {
            formatter.warn("Aborting setup");
            return Ok(());
        };

        let config = ConfigBuilder::new()
            .save_dir(answers.save_dir.clone())
            .device_url(answers.device_url())
            .build_validated()
            .map_err(|errors| {
                let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
                anyhow::anyhow!("Invalid setup: {}", details.join("; "))
            })?;

        ensure_writable(&config.save_dir)?;
        config.write(&path)?;

        formatter.success(&format!("Config written to {}", path.display()));
        formatter.info(&format!("Run `notevault backup` to back up {}", config.device_url));
        Ok(())
    }
}
