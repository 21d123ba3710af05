//! CLI for autobook.

mod commands;

use anyhow::Result;
use autobook_core::config::{self, Settings};
use chrono::{NaiveDate, Offset};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use commands::{run_booking, run_check, run_search};

/// Exit status for configuration problems (missing or invalid settings).
pub const EXIT_CONFIG: u8 = 2;
/// Exit status for any other failure.
pub const EXIT_FAILURE: u8 = 1;

/// Top-level CLI for autobook.
#[derive(Debug, Parser)]
#[command(name = "autobook")]
#[command(about = "Poll a class schedule and book the first matching slot", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/autobook/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file (default: ~/.local/state/autobook/autobook.log).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Poll until a matching class is found, then book it.
    Run,

    /// Fetch one listing and show how each class fares against the filters.
    Search {
        /// Date to list (YYYY-MM-DD). Defaults to the computed target date.
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,
    },

    /// Validate the configuration and print the resolved run plan.
    Check,
}

impl CliCommand {
    /// Whether the command talks to the login endpoint and so needs the
    /// account and OAuth client settings.
    fn needs_login(&self) -> bool {
        matches!(self, CliCommand::Run | CliCommand::Check)
    }
}

impl Cli {
    pub async fn execute(self) -> ExitCode {
        let settings = match load_settings(self.config.as_deref(), self.command.needs_login()) {
            Ok(s) => s,
            Err(err) => {
                eprintln!("autobook: configuration error: {:#}", err);
                return ExitCode::from(EXIT_CONFIG);
            }
        };
        tracing::debug!("loaded settings: {:?}", settings);

        let result = match self.command {
            CliCommand::Run => run_booking(settings).await,
            CliCommand::Search { date } => run_search(settings, date).await,
            CliCommand::Check => run_check(&settings),
        };
        result.unwrap_or_else(|err| {
            eprintln!("autobook error: {:#}", err);
            ExitCode::from(EXIT_FAILURE)
        })
    }
}

/// Load the config file, apply `AUTOBOOK_*` overrides, and validate against
/// the machine's current UTC offset. Without `login`, account and OAuth
/// client values may be left unset.
fn load_settings(path: Option<&Path>, login: bool) -> Result<Settings> {
    let mut cfg = config::load_or_init(path)?;
    cfg.apply_env_overrides(|name| std::env::var(name).ok())?;
    let local_offset = chrono::Local::now().offset().fix();
    let settings = if login {
        cfg.validate(local_offset)?
    } else {
        cfg.validate_catalog(local_offset)?
    };
    Ok(settings)
}
