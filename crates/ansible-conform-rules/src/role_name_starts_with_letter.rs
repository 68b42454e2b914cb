//! Rule requiring role names to start with a letter.

use ansible_conform_core::{Artifact, Failure, Rule, RuleTarget, Verdict};

/// Rule code for role-name-starts-with-letter.
pub const CODE: &str = "AC002";

/// Rule name for role-name-starts-with-letter.
pub const NAME: &str = "role-name-starts-with-letter";

/// Requires the first character of a role name to be an ASCII letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleNameStartsWithLetter;

impl RoleNameStartsWithLetter {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for RoleNameStartsWithLetter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Role names start with a letter"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Role
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        let name = &artifact.name;
        if name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            Verdict::Pass
        } else {
            Verdict::Fail(Failure::new(format!(
                "Role name `{name}` must start with a letter"
            )))
        }
    }
}
