//! Rule trait for defining convention checks.

use crate::artifact::{Artifact, ArtifactKind};
use crate::types::{Severity, Suggestion};
use serde::{Deserialize, Serialize};

/// What a rule is written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleTarget {
    /// Role directories.
    Role,
    /// Playbook files.
    Playbook,
    /// Role task files.
    Task,
    /// Variable names in variable files.
    Variable,
    /// Tags.
    Tag,
    /// Directory paths held in variable files.
    Directory,
    /// Every artifact.
    Any,
}

impl RuleTarget {
    /// Returns true if rules with this target apply to the given artifact kind.
    #[must_use]
    pub fn applies_to(self, kind: ArtifactKind) -> bool {
        match self {
            Self::Any => true,
            Self::Role => kind == ArtifactKind::Role,
            Self::Playbook => kind == ArtifactKind::Playbook,
            Self::Task => kind == ArtifactKind::Task,
            Self::Variable | Self::Directory => kind == ArtifactKind::VariableFile,
            Self::Tag => kind == ArtifactKind::Tag,
        }
    }
}

impl std::fmt::Display for RuleTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Role => "role",
            Self::Playbook => "playbook",
            Self::Task => "task",
            Self::Variable => "variable",
            Self::Tag => "tag",
            Self::Directory => "directory",
            Self::Any => "any",
        };
        f.write_str(s)
    }
}

/// Details of a rule violation, before it becomes a finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Human-readable message.
    pub message: String,
    /// Line inside the artifact (0 for the whole artifact).
    pub line: usize,
    /// Optional fix.
    pub suggestion: Option<Suggestion>,
}

impl Failure {
    /// Creates a failure covering the whole artifact.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: 0,
            suggestion: None,
        }
    }

    /// Points the failure at a line.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Adds a suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(Suggestion::new(suggestion));
        self
    }
}

/// The outcome of a rule's predicate on one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The artifact conforms.
    Pass,
    /// The artifact violates the rule.
    Fail(Failure),
    /// The rule has nothing to say about this artifact.
    NotApplicable,
}

/// A convention check applied to classified artifacts.
///
/// Implementations must be deterministic: the same artifact always yields
/// the same verdict.
///
/// # Example
///
/// ```ignore
/// use ansible_conform_core::{Artifact, Classified, Failure, Rule, RuleTarget, Verdict};
///
/// pub struct NoEmptyRoles;
///
/// impl Rule for NoEmptyRoles {
///     fn name(&self) -> &'static str { "no-empty-roles" }
///     fn code(&self) -> &'static str { "X001" }
///     fn target(&self) -> RuleTarget { RuleTarget::Role }
///
///     fn check(&self, artifact: &Artifact) -> Verdict {
///         match &artifact.class {
///             Classified::Role(facts) if facts.task_count() == 0 => {
///                 Verdict::Fail(Failure::new("role has no tasks"))
///             }
///             Classified::Role(_) => Verdict::Pass,
///             _ => Verdict::NotApplicable,
///         }
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case identifier of this rule (e.g., "tag-name-lowercase").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "AC005").
    fn code(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns what this rule is written against.
    fn target(&self) -> RuleTarget;

    /// Returns the default severity for failures from this rule.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Evaluates the rule against a single artifact.
    ///
    /// Only called for artifacts whose kind matches [`Rule::target`].
    fn check(&self, artifact: &Artifact) -> Verdict;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

#[cfg(test)]
mod tests {
    use super::*;

    struct TestRule;

    impl Rule for TestRule {
        fn name(&self) -> &'static str {
            "test-rule"
        }
        fn code(&self) -> &'static str {
            "TEST001"
        }
        fn target(&self) -> RuleTarget {
            RuleTarget::Tag
        }
        fn check(&self, _artifact: &Artifact) -> Verdict {
            Verdict::Pass
        }
    }

    #[test]
    fn test_rule_defaults() {
        let rule = TestRule;
        assert_eq!(rule.name(), "test-rule");
        assert_eq!(rule.description(), "");
        assert_eq!(rule.default_severity(), Severity::Error);
    }

    #[test]
    fn variable_and_directory_targets_route_to_variable_files() {
        assert!(RuleTarget::Variable.applies_to(ArtifactKind::VariableFile));
        assert!(RuleTarget::Directory.applies_to(ArtifactKind::VariableFile));
        assert!(!RuleTarget::Directory.applies_to(ArtifactKind::Role));
    }

    #[test]
    fn any_target_routes_everywhere() {
        assert!(ArtifactKind::ALL
            .iter()
            .all(|kind| RuleTarget::Any.applies_to(*kind)));
    }

    #[test]
    fn failure_builder() {
        let failure = Failure::new("bad").at_line(3).with_suggestion("fix it");
        assert_eq!(failure.line, 3);
        assert_eq!(failure.suggestion, Some(Suggestion::new("fix it")));
    }
}
