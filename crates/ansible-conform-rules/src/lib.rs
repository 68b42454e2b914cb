//! # ansible-conform-rules
//!
//! Style guide rules for ansible-conform.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | AC001 | `role-name-lowercase-alphanumeric` | Role names use only `[a-z0-9_]` |
//! | AC002 | `role-name-starts-with-letter` | Role names start with a letter |
//! | AC003 | `max-40-tasks-per-role` | Roles hold at most 40 non-debug tasks |
//! | AC004 | `task-name-starts-uppercase` | Task names start with an uppercase letter |
//! | AC005 | `tag-name-lowercase` | Tags contain no uppercase characters |
//! | AC006 | `variable-name-lowercase` | Variable names match `[a-z_][a-z0-9_]*` |
//! | AC007 | `directory-path-trailing-slash` | `*_dir` variables end with `/` |
//!
//! The core crate registers `malformed-artifact` (AC900) and
//! `unreadable-path` (AC901) ahead of these.
//!
//! ## Usage
//!
//! ```ignore
//! use ansible_conform_core::{Config, Evaluator, ProjectScanner};
//! use ansible_conform_rules::default_registry;
//!
//! let config = Config::default();
//! let registry = default_registry(&config, None)?;
//! let scanner = ProjectScanner::builder().root(".").config(&config.scanner).build()?;
//! let report = Evaluator::new(&registry).run(&scanner)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod directory_trailing_slash;
mod max_tasks_per_role;
mod presets;
mod role_name_lowercase;
mod role_name_starts_with_letter;
mod tag_name_lowercase;
mod task_name_uppercase;
mod variable_name_lowercase;

pub use directory_trailing_slash::DirectoryTrailingSlash;
pub use max_tasks_per_role::{MaxTasksPerRole, MaxTasksPerRoleConfig};
pub use presets::{all_rules, default_registry};
pub use role_name_lowercase::RoleNameLowercase;
pub use role_name_starts_with_letter::RoleNameStartsWithLetter;
pub use tag_name_lowercase::TagNameLowercase;
pub use task_name_uppercase::TaskNameUppercase;
pub use variable_name_lowercase::VariableNameLowercase;

/// Re-export core types for convenience.
pub use ansible_conform_core::{Finding, Rule, Severity};
