//! Rule requiring task names to start with an uppercase letter.
//!
//! Task names are printed by `ansible-playbook` as run headlines, so they
//! read as sentences. Unnamed tasks are ignored.

use std::fmt::Write as _;

use ansible_conform_core::{Artifact, Classified, Failure, Rule, RuleTarget, Severity, Verdict};

/// Rule code for task-name-starts-uppercase.
pub const CODE: &str = "AC004";

/// Rule name for task-name-starts-uppercase.
pub const NAME: &str = "task-name-starts-uppercase";

/// Requires every named task to start with an uppercase letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskNameUppercase;

impl TaskNameUppercase {
    /// Creates a new rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

impl Rule for TaskNameUppercase {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Task names start with an uppercase letter"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Task
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        let Classified::Task(tasks) = &artifact.class else {
            return Verdict::NotApplicable;
        };

        let mut named = tasks
            .iter()
            .filter_map(|t| t.name.as_deref().map(|name| (name, t.line)))
            .peekable();
        if named.peek().is_none() {
            return Verdict::NotApplicable;
        }

        let offending: Vec<(&str, usize)> = named
            .filter(|(name, _)| !name.chars().next().is_some_and(char::is_uppercase))
            .collect();
        let Some(&(name, line)) = offending.first() else {
            return Verdict::Pass;
        };

        let mut message = format!("Task name `{name}` must start with an uppercase letter");
        if offending.len() > 1 {
            let _ = write!(message, " (+{} more in this file)", offending.len() - 1);
        }
        Verdict::Fail(
            Failure::new(message)
                .at_line(line)
                .with_suggestion(format!("rename the task to `{}`", capitalize(name))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ansible_conform_core::TaskEntry;

    fn task_file(names: &[Option<&str>]) -> Artifact {
        let tasks = names
            .iter()
            .enumerate()
            .map(|(i, name)| TaskEntry {
                name: name.map(String::from),
                tags: Vec::new(),
                line: i * 3 + 1,
            })
            .collect();
        Artifact::new(
            "roles/web/tasks/main.yml",
            "main.yml",
            Classified::Task(tasks),
        )
    }

    #[test]
    fn lowercase_name_fails_at_its_line() {
        let artifact = task_file(&[Some("Install nginx"), Some("check connectivity")]);
        let Verdict::Fail(failure) = TaskNameUppercase::new().check(&artifact) else {
            panic!("expected failure");
        };
        assert_eq!(
            failure.message,
            "Task name `check connectivity` must start with an uppercase letter"
        );
        assert_eq!(failure.line, 4);
        assert_eq!(
            failure.suggestion.unwrap().message,
            "rename the task to `Check connectivity`"
        );
    }

    #[test]
    fn additional_offenders_are_counted() {
        let artifact = task_file(&[Some("restart nginx"), Some("reload"), Some("Ok")]);
        let Verdict::Fail(failure) = TaskNameUppercase::new().check(&artifact) else {
            panic!("expected failure");
        };
        assert!(failure.message.ends_with("(+1 more in this file)"));
        assert_eq!(failure.line, 1);
    }

    #[test]
    fn capitalized_names_pass_and_unnamed_are_ignored() {
        let artifact = task_file(&[Some("Check connectivity"), None]);
        assert_eq!(TaskNameUppercase::new().check(&artifact), Verdict::Pass);
    }

    #[test]
    fn file_without_named_tasks_is_not_applicable() {
        assert_eq!(
            TaskNameUppercase::new().check(&task_file(&[None])),
            Verdict::NotApplicable
        );
        assert_eq!(
            TaskNameUppercase::new().check(&task_file(&[])),
            Verdict::NotApplicable
        );
    }
}
