//! Rule requiring role names to be lowercase alphanumerics and underscores.
//!
//! # Rationale
//!
//! Role names end up in `roles:` lists, Galaxy metadata and filesystem paths.
//! Mixed case and punctuation make them easy to mistype and awkward to
//! reference.
//!
//! # Detected Patterns
//!
//! - `roles/Elasticsearch_Cluster/`
//! - `roles/web-server/`

use ansible_conform_core::{Artifact, Failure, Rule, RuleTarget, Verdict};

/// Rule code for role-name-lowercase-alphanumeric.
pub const CODE: &str = "AC001";

/// Rule name for role-name-lowercase-alphanumeric.
pub const NAME: &str = "role-name-lowercase-alphanumeric";

/// Requires role names to match `[a-z0-9_]+`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleNameLowercase;

impl RoleNameLowercase {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn is_valid(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Lowercases a name and folds every other character into `_`.
fn normalize(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl Rule for RoleNameLowercase {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Role names use only lowercase letters, digits and underscores"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Role
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        let name = &artifact.name;
        if is_valid(name) {
            return Verdict::Pass;
        }
        Verdict::Fail(
            Failure::new(format!(
                "Role name `{name}` must contain only lowercase letters, digits and underscores"
            ))
            .with_suggestion(format!("rename the role to `{}`", normalize(name))),
        )
    }
}
