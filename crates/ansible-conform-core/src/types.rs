//! Core types for rule findings.

use crate::artifact::ArtifactKind;
use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Serializes a path as a string, replacing invalid UTF-8 sequences.
fn serialize_path_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Convention that should be addressed.
    Warning,
    /// Convention that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown severity `{other}` (expected warning|error)")),
        }
    }
}

/// Location inside the project tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File or directory path relative to the project root.
    #[serde(serialize_with = "serialize_path_lossy")]
    pub file: PathBuf,
    /// Line number (1-indexed), or 0 when the finding covers the whole entry.
    pub line: usize,
}

impl Location {
    /// Creates a location pointing at a specific line.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Creates a location covering a whole file or directory.
    #[must_use]
    pub fn whole(file: impl Into<PathBuf>) -> Self {
        Self::new(file, 0)
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}:{}", self.file.display(), self.line)
        }
    }
}

/// A suggested fix for a failing finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Human-readable description of the fix.
    pub message: String,
}

impl Suggestion {
    /// Creates a new suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Whether an artifact satisfied a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The artifact conforms to the rule.
    Pass,
    /// The artifact violates the rule.
    Fail,
}

/// Reference to the artifact a finding is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Artifact classification.
    pub kind: ArtifactKind,
    /// Path relative to the project root.
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,
    /// Display name (role name, tag name, file name).
    pub name: String,
}

/// The result of evaluating one rule against one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule identifier (e.g., "role-name-starts-with-letter").
    pub rule: String,
    /// Rule code (e.g., "AC002").
    pub code: String,
    /// Severity the rule was registered with.
    pub severity: Severity,
    /// Pass or fail.
    pub outcome: Outcome,
    /// The artifact that was checked.
    pub artifact: ArtifactRef,
    /// Primary location of the finding.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Optional suggestion for fixing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

impl Finding {
    /// Returns true if the artifact violated the rule.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Fail
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.outcome {
            Outcome::Fail => write!(
                f,
                "{}: {} [{}] {}",
                self.location, self.severity, self.code, self.message
            ),
            Outcome::Pass => write!(f, "{}: ok [{}] {}", self.location, self.code, self.rule),
        }
    }
}
