//! The default rule set and the registry built from it.

use crate::{
    max_tasks_per_role, DirectoryTrailingSlash, MaxTasksPerRole, RoleNameLowercase,
    RoleNameStartsWithLetter, TagNameLowercase, TaskNameUppercase, VariableNameLowercase,
};
use ansible_conform_core::{Config, RegistryError, RuleBox, RuleRegistry};
use tracing::warn;

fn max_tasks_rule(config: &Config) -> MaxTasksPerRole {
    let mut rule = MaxTasksPerRole::new();
    let Some(options) = config.rule(max_tasks_per_role::NAME) else {
        return rule;
    };

    if options.options.contains_key("max_tasks") {
        match usize::try_from(options.get_int("max_tasks", -1)) {
            Ok(max) => rule = rule.max_tasks(max),
            Err(_) => warn!(
                "Ignoring invalid max_tasks for {}; using {}",
                max_tasks_per_role::NAME,
                max_tasks_per_role::DEFAULT_MAX_TASKS
            ),
        }
    }
    rule.debug_tag(options.get_str("debug_tag", max_tasks_per_role::DEFAULT_DEBUG_TAG))
}

fn directory_rule(config: &Config) -> DirectoryTrailingSlash {
    let rule = DirectoryTrailingSlash::new();
    match config
        .rule(crate::directory_trailing_slash::NAME)
        .and_then(|options| options.get_str_array("suffixes"))
    {
        Some(suffixes) => rule.suffixes(suffixes),
        None => rule,
    }
}

/// Returns every style guide rule, configured from `config`, in listing order.
///
/// Includes:
/// - `role-name-lowercase-alphanumeric` (AC001)
/// - `role-name-starts-with-letter` (AC002)
/// - `max-40-tasks-per-role` (AC003) - reads `max_tasks` and `debug_tag`
/// - `task-name-starts-uppercase` (AC004)
/// - `tag-name-lowercase` (AC005)
/// - `variable-name-lowercase` (AC006)
/// - `directory-path-trailing-slash` (AC007) - reads `suffixes`
#[must_use]
pub fn all_rules(config: &Config) -> Vec<RuleBox> {
    vec![
        Box::new(RoleNameLowercase::new()),
        Box::new(RoleNameStartsWithLetter::new()),
        Box::new(max_tasks_rule(config)),
        Box::new(TaskNameUppercase::new()),
        Box::new(TagNameLowercase::new()),
        Box::new(VariableNameLowercase::new()),
        Box::new(directory_rule(config)),
    ]
}

/// Builds the registry used by the CLI.
///
/// `only` restricts the run to the given rule ids or codes; the built-in
/// defect rules always stay registered.
///
/// # Errors
///
/// Returns [`RegistryError::NotFound`] if `only` names an unknown rule.
pub fn default_registry(config: &Config, only: Option<&[String]>) -> Result<RuleRegistry, RegistryError> {
    let mut builder = RuleRegistry::builder()
        .rules(all_rules(config))
        .config(config.clone());
    if let Some(ids) = only {
        builder = builder.only(ids.iter().cloned());
    }
    builder.build()
}
