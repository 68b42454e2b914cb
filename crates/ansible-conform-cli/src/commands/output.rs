//! Shared output for check reports.

use ansible_conform_core::{Report, ReportFormat};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::OutputFormat;

/// Writes a report to `output`, or to stdout when no file is given.
pub fn write(report: &Report, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let format: ReportFormat = format.into();
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create report file {}", path.display()))?;
            report
                .write_to(BufWriter::new(file), format)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Wrote report to {}", path.display());
        }
        None => report
            .write_to(std::io::stdout().lock(), format)
            .context("Failed to write report to stdout")?,
    }
    Ok(())
}
