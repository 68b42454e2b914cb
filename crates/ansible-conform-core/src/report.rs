//! Aggregated findings and their renderings.

use crate::types::{Finding, Severity};

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use thiserror::Error;

/// Errors raised while rendering or writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON serialization failed.
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to the sink failed.
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Output format for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Failures grouped by rule, then a summary line.
    #[default]
    Text,
    /// Summary object plus every finding.
    Json,
    /// One line per failure.
    Compact,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown format `{other}` (expected text|json|compact)")),
        }
    }
}

/// Counts shown at the end of every report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Failing findings at error severity.
    pub errors: usize,
    /// Failing findings at warning severity.
    pub warnings: usize,
    /// Passing findings.
    pub passed: usize,
    /// Artifacts the scanner produced.
    pub artifacts: usize,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    findings: &'a [Finding],
}

/// The result of one check run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Findings, sorted by artifact path, kind, name, then rule id.
    pub findings: Vec<Finding>,
    /// Number of artifacts evaluated.
    pub artifacts_scanned: usize,
}

impl Report {
    /// Creates a report, sorting the findings.
    #[must_use]
    pub fn new(mut findings: Vec<Finding>, artifacts_scanned: usize) -> Self {
        findings.sort_by(|a, b| {
            a.artifact
                .path
                .cmp(&b.artifact.path)
                .then(a.artifact.kind.cmp(&b.artifact.kind))
                .then_with(|| a.artifact.name.cmp(&b.artifact.name))
                .then_with(|| a.rule.cmp(&b.rule))
        });
        Self {
            findings,
            artifacts_scanned,
        }
    }

    /// Returns the failing findings.
    pub fn failures(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_failure())
    }

    /// Returns the number of passing findings.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.findings.iter().filter(|f| !f.is_failure()).count()
    }

    /// Counts failures as `(errors, warnings)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let errors = self
            .failures()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let warnings = self
            .failures()
            .filter(|f| f.severity == Severity::Warning)
            .count();
        (errors, warnings)
    }

    /// Returns true if any failure has error severity.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_failures_at(Severity::Error)
    }

    /// Returns true if any failure is at or above the given severity.
    #[must_use]
    pub fn has_failures_at(&self, threshold: Severity) -> bool {
        self.failures().any(|f| f.severity >= threshold)
    }

    /// Returns failures at exactly the given severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.failures().filter(|f| f.severity == severity).collect()
    }

    /// Groups failures by rule id.
    #[must_use]
    pub fn by_rule(&self) -> BTreeMap<&str, Vec<&Finding>> {
        let mut groups: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in self.failures() {
            groups.entry(finding.rule.as_str()).or_default().push(finding);
        }
        groups
    }

    /// Returns the summary counts.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let (errors, warnings) = self.count_by_severity();
        Summary {
            errors,
            warnings,
            passed: self.passed(),
            artifacts: self.artifacts_scanned,
        }
    }

    /// Renders the report in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render(&self, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::Text => Ok(self.render_text()),
            ReportFormat::Json => self.render_json(),
            ReportFormat::Compact => Ok(self.render_compact()),
        }
    }

    /// Renders failures grouped by rule, followed by a summary line.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for (rule, failures) in self.by_rule() {
            let Some(first) = failures.first() else {
                continue;
            };
            let _ = writeln!(
                out,
                "{rule} [{}] {}: {} failure(s)",
                first.code,
                first.severity,
                failures.len()
            );
            for finding in &failures {
                let _ = writeln!(out, "  {}: {}", finding.location, finding.message);
                if let Some(suggestion) = &finding.suggestion {
                    let _ = writeln!(out, "    = help: {}", suggestion.message);
                }
            }
            out.push('\n');
        }

        let summary = self.summary();
        let _ = write!(
            out,
            "Found {} error(s), {} warning(s) in {} artifact(s); {} check(s) passed",
            summary.errors, summary.warnings, summary.artifacts, summary.passed
        );
        out
    }

    /// Renders the summary and every finding as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render_json(&self) -> Result<String, ReportError> {
        let report = JsonReport {
            summary: self.summary(),
            findings: &self.findings,
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Renders one line per failure.
    #[must_use]
    pub fn render_compact(&self) -> String {
        self.failures()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Renders the report and writes it, newline-terminated, to a sink.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_to<W: std::io::Write>(
        &self,
        mut writer: W,
        format: ReportFormat,
    ) -> Result<(), ReportError> {
        let rendered = self.render(format)?;
        if !rendered.is_empty() {
            writeln!(writer, "{rendered}")?;
        }
        writer.flush()?;
        Ok(())
    }
}
