//! Rule requiring variable names to be lowercase snake case.
//!
//! Ansible variable names share one namespace across roles, inventories and
//! extra vars. Lowercase snake case keeps them valid Python identifiers and
//! avoids collisions that differ only by case.

use std::fmt::Write as _;

use ansible_conform_core::{Artifact, Classified, Failure, Rule, RuleTarget, Verdict};

/// Rule code for variable-name-lowercase.
pub const CODE: &str = "AC006";

/// Rule name for variable-name-lowercase.
pub const NAME: &str = "variable-name-lowercase";

/// Requires variable names to match `[a-z_][a-z0-9_]*`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableNameLowercase;

impl VariableNameLowercase {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_valid(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Converts `camelCase`, `Mixed-Case` and similar into snake case.
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            out.push('_');
            prev_lower = false;
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

impl Rule for VariableNameLowercase {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Variable names are lowercase snake case"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Variable
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        let Classified::VariableFile(facts) = &artifact.class else {
            return Verdict::NotApplicable;
        };
        if facts.variables.is_empty() {
            return Verdict::NotApplicable;
        }

        let offending: Vec<_> = facts
            .variables
            .iter()
            .filter(|v| !is_valid(&v.name))
            .collect();
        let Some(first) = offending.first() else {
            return Verdict::Pass;
        };

        let mut message = format!(
            "Variable `{}` must match [a-z_][a-z0-9_]*",
            first.name
        );
        if offending.len() > 1 {
            let _ = write!(message, " (+{} more in this file)", offending.len() - 1);
        }
        Verdict::Fail(
            Failure::new(message)
                .at_line(first.line)
                .with_suggestion(format!("rename it to `{}`", to_snake_case(&first.name))),
        )
    }
}
