//! notevault CLI - Command-line interface for notevault
//!
//! Provides commands for:
//! - Backing up the device into dated folders
//! - Uploading local files to the device
//! - Interactive first-run setup

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod output;

use commands::{backup::BackupCommand, setup::SetupCommand, upload::UploadCommand, GlobalArgs};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "notevault",
    version,
    about = "Incremental backups of a note-taking device over Wi-Fi"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Full path of the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Back up the device into today's dated folder
    Backup(BackupCommand),
    /// Send local files to a device folder
    Upload(UploadCommand),
    /// Create the config file interactively
    Setup(SetupCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let global = GlobalArgs {
        format,
        config: cli.config,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Backup(cmd) => cmd.execute(&global).await,
        Commands::Upload(cmd) => cmd.execute(&global).await,
        Commands::Setup(cmd) => cmd.execute(&global).await,
    };

    if let Err(e) = result {
        get_formatter(cli.json).error(&format!("{e:#}"));
        std::process::exit(1);
    }
    Ok(())
}
