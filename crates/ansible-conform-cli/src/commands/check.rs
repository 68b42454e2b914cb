//! Check command implementation.

use ansible_conform_core::{Evaluator, ProjectScanner, Severity};
use ansible_conform_rules::default_registry;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use crate::config_resolver;
use crate::OutputFormat;

/// Options for one `check` run.
pub struct CheckOptions<'a> {
    /// Project root.
    pub path: &'a Path,
    /// Explicit `--config` path.
    pub config_path: Option<&'a Path>,
    /// Report format.
    pub format: OutputFormat,
    /// `--severity-threshold`, overriding the configured `fail_on`.
    pub severity_threshold: Option<Severity>,
    /// Comma-separated rule ids or codes.
    pub rules: Option<&'a str>,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
    /// Report file, instead of stdout.
    pub output: Option<&'a Path>,
    /// Evaluate artifacts in parallel.
    pub parallel: bool,
}

fn parse_rule_filter(filter: &str) -> Vec<String> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

/// Runs the check command.
pub fn run(options: &CheckOptions<'_>) -> Result<ExitCode> {
    let (config, source) = config_resolver::load(options.path, options.config_path)?;

    let only = options.rules.map(parse_rule_filter);
    let registry =
        default_registry(&config, only.as_deref()).context("Failed to build rule registry")?;

    let scanner = ProjectScanner::builder()
        .root(options.path)
        .config(&config.scanner)
        .excludes(options.exclude.iter().cloned())
        .build()?;

    let parallel = options.parallel || config.scanner.parallel;
    tracing::info!(
        "Checking {} with {} rules ({source})",
        scanner.root().display(),
        registry.len()
    );

    let report = Evaluator::new(&registry).parallel(parallel).run(&scanner)?;

    super::output::write(&report, options.format, options.output)?;

    let threshold = options
        .severity_threshold
        .or(config.fail_on)
        .unwrap_or(Severity::Error);
    if report.has_failures_at(threshold) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
