//! Top-level CLI definition and dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory as _, Parser, Subcommand};
use clap_complete::Shell;

use crate::cli::commands;
use crate::core::config::SupervisorConfig;
use crate::core::errors::Result;
use crate::logger::EventLog;

/// Wallet Daemon Helper — supervises the startup of a wallet backend daemon.
#[derive(Parser)]
#[command(name = "wdh", version, about)]
pub struct Cli {
    /// Path to a TOML config file (defaults apply when omitted).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append lifecycle events to a JSONL file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Emit machine-readable JSON where supported.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Ensure the daemon is running; if we started it, hold until
    /// SIGINT/SIGTERM and then stop it cleanly.
    Start,
    /// Probe the daemon once and report its status.
    Status,
    /// Send a stop request to the daemon.
    Stop,
    /// Generate a shell completion script on stdout.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Dispatch CLI commands.
///
/// # Errors
/// Returns an error if config loading or the subcommand fails.
pub fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SupervisorConfig::load(path)?,
        None => SupervisorConfig::default(),
    };
    let log = Arc::new(
        cli.log
            .as_deref()
            .map_or_else(EventLog::stderr_only, EventLog::open),
    );

    match &cli.command {
        Command::Start => commands::start(config, log),
        Command::Status => commands::status(&config, cli.json),
        Command::Stop => commands::stop(&config),
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "wdh", &mut std::io::stdout());
            Ok(())
        }
    }
}
