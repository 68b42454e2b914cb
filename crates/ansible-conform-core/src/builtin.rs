//! Rules that surface scan-time defects as findings.
//!
//! These are registered ahead of every other rule and cannot be disabled:
//! a file that cannot be parsed or read is always reported.

use crate::artifact::{Artifact, Defect};
use crate::rule::{Failure, Rule, RuleTarget, Verdict};
use crate::types::Severity;

/// Rule name for malformed artifacts.
pub const MALFORMED_ARTIFACT: &str = "malformed-artifact";

/// Rule name for unreadable paths.
pub const UNREADABLE_PATH: &str = "unreadable-path";

/// Reports artifacts whose content does not have the expected structure.
#[derive(Debug, Clone, Copy, Default)]
pub struct MalformedArtifact;

impl Rule for MalformedArtifact {
    fn name(&self) -> &'static str {
        MALFORMED_ARTIFACT
    }

    fn code(&self) -> &'static str {
        "AC900"
    }

    fn description(&self) -> &'static str {
        "Files must parse as the YAML structure their location implies"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Any
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        match &artifact.defect {
            Some(Defect::Malformed(message)) => Verdict::Fail(
                Failure::new(format!("Cannot parse {}: {message}", artifact.kind()))
                    .with_suggestion("fix the YAML so it matches the expected layout"),
            ),
            Some(Defect::Unreadable(_)) => Verdict::NotApplicable,
            None => Verdict::Pass,
        }
    }
}

/// Reports paths the scanner could not read.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreadablePath;

impl Rule for UnreadablePath {
    fn name(&self) -> &'static str {
        UNREADABLE_PATH
    }

    fn code(&self) -> &'static str {
        "AC901"
    }

    fn description(&self) -> &'static str {
        "Every path in the project must be readable by the checker"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Any
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        match &artifact.defect {
            Some(Defect::Unreadable(message)) => Verdict::Fail(Failure::new(format!(
                "Skipped unreadable path {}: {message}",
                artifact.path.display()
            ))),
            Some(Defect::Malformed(_)) => Verdict::NotApplicable,
            None => Verdict::Pass,
        }
    }
}
