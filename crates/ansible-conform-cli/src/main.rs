//! ansible-conform CLI tool.
//!
//! Usage:
//! ```bash
//! ansible-conform check [OPTIONS] [PATH]
//! ansible-conform list-rules
//! ansible-conform init
//! ```
//!
//! Exit codes: 0 when no failure reaches the severity threshold, 1 when one
//! does, 2 on fatal errors such as an unrecognized project layout.

use ansible_conform_core::{ReportFormat, ScanError, Severity};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Exit code for fatal errors.
const EXIT_FATAL: u8 = 2;

/// Checks Ansible projects against the style guide's naming and layout rules
#[derive(Parser)]
#[command(name = "ansible-conform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a project
    Check {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Lowest failure severity that makes the run fail (default: error)
        #[arg(long)]
        severity_threshold: Option<Threshold>,

        /// Only run specific rules (comma-separated ids or codes)
        #[arg(long)]
        rules: Option<String>,

        /// Exclude patterns (can be specified multiple times)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Evaluate artifacts in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Failures grouped by rule, with a summary.
    #[default]
    Text,
    /// JSON with a summary and every finding.
    Json,
    /// One-line-per-failure compact format.
    Compact,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
            OutputFormat::Compact => Self::Compact,
        }
    }
}

/// Severity threshold for the exit code.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Threshold {
    /// Fail on warnings and errors.
    Warning,
    /// Fail on errors only.
    Error,
}

impl From<Threshold> for Severity {
    fn from(threshold: Threshold) -> Self {
        match threshold {
            Threshold::Warning => Self::Warning,
            Threshold::Error => Self::Error,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            report_fatal(err);
            ExitCode::from(EXIT_FATAL)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Check {
            path,
            format,
            severity_threshold,
            rules,
            exclude,
            output,
            parallel,
        } => commands::check::run(&commands::check::CheckOptions {
            path: &path,
            config_path,
            format,
            severity_threshold: severity_threshold.map(Severity::from),
            rules: rules.as_deref(),
            exclude,
            output: output.as_deref(),
            parallel,
        }),
        Commands::ListRules => {
            commands::list_rules::run(Path::new("."), config_path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { force } => {
            commands::init::run(Path::new("."), force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Prints a fatal error, rendering scan errors as diagnostics.
fn report_fatal(err: anyhow::Error) {
    match err.downcast::<ScanError>() {
        Ok(scan_err) => eprintln!("{:?}", miette::Report::new(scan_err)),
        Err(other) => eprintln!("Error: {other:#}"),
    }
}
