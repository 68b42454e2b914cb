//! Rule requiring tag names to be lowercase.

use ansible_conform_core::{Artifact, Failure, Rule, RuleTarget, Severity, Verdict};

/// Rule code for tag-name-lowercase.
pub const CODE: &str = "AC005";

/// Rule name for tag-name-lowercase.
pub const NAME: &str = "tag-name-lowercase";

/// Requires tags to contain no uppercase characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagNameLowercase;

impl TagNameLowercase {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for TagNameLowercase {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Tag names are lowercase"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Tag
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        let tag = &artifact.name;
        if !tag.chars().any(char::is_uppercase) {
            return Verdict::Pass;
        }
        Verdict::Fail(
            Failure::new(format!("Tag `{tag}` must be lowercase"))
                .with_suggestion(format!("use `{}`", tag.to_lowercase())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ansible_conform_core::{Classified, TagFacts};
    use std::path::PathBuf;

    fn tag(name: &str) -> Artifact {
        Artifact::new(
            "site.yml",
            name,
            Classified::Tag(TagFacts {
                used_in: vec![PathBuf::from("site.yml")],
            }),
        )
    }

    #[test]
    fn uppercase_tag_fails() {
        let Verdict::Fail(failure) = TagNameLowercase::new().check(&tag("WebServer")) else {
            panic!("expected failure");
        };
        assert_eq!(failure.message, "Tag `WebServer` must be lowercase");
        assert_eq!(failure.suggestion.unwrap().message, "use `webserver`");
    }

    #[test]
    fn lowercase_tags_pass() {
        assert_eq!(TagNameLowercase::new().check(&tag("nginx")), Verdict::Pass);
        assert_eq!(TagNameLowercase::new().check(&tag("db-setup_2")), Verdict::Pass);
    }
}
