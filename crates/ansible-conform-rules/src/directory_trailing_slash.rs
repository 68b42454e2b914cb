//! Rule requiring directory variables to end with a slash.
//!
//! # Rationale
//!
//! Paths are usually built by concatenation (`"{{ app_dir }}config.yml"`).
//! A consistent trailing slash on directory variables keeps those joins
//! unambiguous.
//!
//! # Configuration
//!
//! - `suffixes`: Variable name suffixes that mark a directory (default:
//!   `["_dir", "_directory"]`)

use std::fmt::Write as _;

use ansible_conform_core::{
    Artifact, Classified, Failure, Rule, RuleTarget, Severity, VariableEntry, Verdict,
};

/// Rule code for directory-path-trailing-slash.
pub const CODE: &str = "AC007";

/// Rule name for directory-path-trailing-slash.
pub const NAME: &str = "directory-path-trailing-slash";

/// Default name suffixes marking directory variables.
pub const DEFAULT_SUFFIXES: &[&str] = &["_dir", "_directory"];

/// Requires string variables named like directories to end with `/`.
#[derive(Debug, Clone)]
pub struct DirectoryTrailingSlash {
    suffixes: Vec<String>,
}

impl Default for DirectoryTrailingSlash {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryTrailingSlash {
    /// Creates a new rule with the default suffixes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            suffixes: DEFAULT_SUFFIXES.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Replaces the suffixes that mark directory variables.
    #[must_use]
    pub fn suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suffixes = suffixes.into_iter().map(Into::into).collect();
        self
    }

    fn is_directory_variable<'v>(&self, var: &'v VariableEntry) -> Option<&'v str> {
        let value = var.value.as_deref().filter(|v| !v.is_empty())?;
        self.suffixes
            .iter()
            .any(|suffix| var.name.ends_with(suffix.as_str()))
            .then_some(value)
    }
}

impl Rule for DirectoryTrailingSlash {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Directory path variables end with a trailing slash"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Directory
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        let Classified::VariableFile(facts) = &artifact.class else {
            return Verdict::NotApplicable;
        };

        let directories: Vec<(&VariableEntry, &str)> = facts
            .variables
            .iter()
            .filter_map(|var| self.is_directory_variable(var).map(|value| (var, value)))
            .collect();
        if directories.is_empty() {
            return Verdict::NotApplicable;
        }

        let offending: Vec<_> = directories
            .iter()
            .filter(|(_, value)| !value.ends_with('/'))
            .collect();
        let Some((var, value)) = offending.first() else {
            return Verdict::Pass;
        };

        let mut message = format!(
            "Directory variable `{}` = \"{value}\" must end with `/`",
            var.name
        );
        if offending.len() > 1 {
            let _ = write!(message, " (+{} more in this file)", offending.len() - 1);
        }
        Verdict::Fail(
            Failure::new(message)
                .at_line(var.line)
                .with_suggestion(format!("use \"{value}/\"")),
        )
    }
}
