//! Binary entry point for repodigest.
//!
//! Builds a daily Markdown digest of trending GitHub repositories, skipping
//! ones already reported within the configured window.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use repodigest::cli::{CacheCommand, ConfigCommand, RunCommand};
use repodigest::config::DigestConfig;
use repodigest::observability::{self, LoggingConfig};
use std::path::PathBuf;
use std::process::ExitCode;

/// repodigest - a daily digest of trending GitHub repositories.
#[derive(Parser)]
#[command(name = "repodigest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Fetch, rank and write today's digest.
    Run {
        /// Topic to search for.
        #[arg(short, long, default_value = repodigest::cli::DEFAULT_TOPIC)]
        topic: String,

        /// Maximum repositories in the report.
        #[arg(short, long, default_value_t = repodigest::cli::DEFAULT_LIMIT)]
        limit: usize,

        /// Digest date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<String>,
    },

    /// Seen-repo cache maintenance.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Cache subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Print every cache entry.
    Show,
    /// Remove entries outside the window.
    Sweep,
    /// Remove every entry.
    Clear,
}

/// Config subcommands.
#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration.
    Show,
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = observability::init_logging(LoggingConfig::from_env(cli.verbose)) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = DigestConfig::load(cli.config.as_deref());

    match run_command(cli.command, &config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command and returns its output.
fn run_command(command: Commands, config: &DigestConfig) -> repodigest::Result<String> {
    match command {
        Commands::Run { topic, limit, date } => {
            let outcome = RunCommand::new(topic, limit)
                .with_date(date)
                .execute(config)?;
            Ok(RunCommand::summary(&outcome))
        },
        Commands::Cache { action } => {
            let command = match action {
                CacheAction::Show => CacheCommand::Show,
                CacheAction::Sweep => CacheCommand::Sweep,
                CacheAction::Clear => CacheCommand::Clear,
            };
            command.execute(config)
        },
        Commands::Config {
            action: ConfigAction::Show,
        } => ConfigCommand::show(config),
    }
}
