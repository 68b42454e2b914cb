//! Rule to limit the number of tasks in a role.
//!
//! # Rationale
//!
//! A role with dozens of tasks usually does more than one thing. Keeping the
//! count small pushes authors towards single-purpose roles.
//!
//! # Debug tasks
//!
//! Diagnostic tasks do not count towards the limit. A task is debug-only when
//! any of these hold:
//!
//! - it carries the debug tag (`debug` by default)
//! - its file stem is `debug`, or starts with `debug_` or `debug-`
//! - its file sits below a `debug/` directory inside `tasks/`
//!
//! # Configuration
//!
//! - `max_tasks`: Maximum non-debug tasks per role (default: 40)
//! - `debug_tag`: Tag marking debug-only tasks (default: `debug`)

use ansible_conform_core::{
    Artifact, Classified, Failure, Rule, RuleTarget, TaskEntry, TaskFileSummary, Verdict,
};
use std::path::{Component, Path};

/// Rule code for max-40-tasks-per-role.
pub const CODE: &str = "AC003";

/// Rule name for max-40-tasks-per-role.
pub const NAME: &str = "max-40-tasks-per-role";

/// Default task limit.
pub const DEFAULT_MAX_TASKS: usize = 40;

/// Default tag marking debug-only tasks.
pub const DEFAULT_DEBUG_TAG: &str = "debug";

/// Configuration for the task limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxTasksPerRoleConfig {
    /// Maximum non-debug tasks in a role.
    pub max_tasks: usize,
    /// Tag marking debug-only tasks.
    pub debug_tag: String,
}

impl Default for MaxTasksPerRoleConfig {
    fn default() -> Self {
        Self {
            max_tasks: DEFAULT_MAX_TASKS,
            debug_tag: DEFAULT_DEBUG_TAG.to_string(),
        }
    }
}

/// Limits the number of non-debug tasks across a role's task files.
#[derive(Debug, Clone, Default)]
pub struct MaxTasksPerRole {
    config: MaxTasksPerRoleConfig,
}

impl MaxTasksPerRole {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the task limit.
    #[must_use]
    pub fn max_tasks(mut self, max: usize) -> Self {
        self.config.max_tasks = max;
        self
    }

    /// Sets the tag marking debug-only tasks.
    #[must_use]
    pub fn debug_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.debug_tag = tag.into();
        self
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &MaxTasksPerRoleConfig {
        &self.config
    }

    fn is_debug_file(relative: &Path) -> bool {
        let under_debug_dir = relative
            .parent()
            .is_some_and(|dir| dir.components().any(|c| c == Component::Normal("debug".as_ref())));
        let debug_stem = relative
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| {
                stem == "debug" || stem.starts_with("debug_") || stem.starts_with("debug-")
            });
        under_debug_dir || debug_stem
    }

    fn is_debug_task(&self, task: &TaskEntry) -> bool {
        task.tags.iter().any(|t| *t == self.config.debug_tag)
    }

    /// Counts the tasks that are not debug-only.
    #[must_use]
    pub fn counted_tasks(&self, task_files: &[TaskFileSummary]) -> usize {
        task_files
            .iter()
            .filter(|file| !Self::is_debug_file(&file.relative))
            .flat_map(|file| file.tasks.iter())
            .filter(|task| !self.is_debug_task(task))
            .count()
    }
}

impl Rule for MaxTasksPerRole {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn description(&self) -> &'static str {
        "Roles hold at most 40 non-debug tasks (configurable via `max_tasks`)"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Role
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        let Classified::Role(facts) = &artifact.class else {
            return Verdict::NotApplicable;
        };

        let count = self.counted_tasks(&facts.task_files);
        if count <= self.config.max_tasks {
            return Verdict::Pass;
        }

        Verdict::Fail(
            Failure::new(format!(
                "Role `{}` has {count} tasks (max {})",
                artifact.name, self.config.max_tasks
            ))
            .with_suggestion(format!(
                "split the role into smaller roles, or tag diagnostic tasks with `{}`",
                self.config.debug_tag
            )),
        )
    }
}
