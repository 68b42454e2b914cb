//! Path-based classification of project entries.
//!
//! All paths are relative to the project root.

use crate::artifact::ArtifactKind;
use std::path::{Component, Path};

/// Root-level YAML files that are never playbooks.
const NON_PLAYBOOK_FILES: &[&str] = &[
    "requirements.yml",
    "requirements.yaml",
    "galaxy.yml",
    "galaxy.yaml",
    "docker-compose.yml",
    "docker-compose.yaml",
    "mkdocs.yml",
    "mkdocs.yaml",
    "ansible-conform.yml",
];

/// Directories under a role whose YAML files hold variables.
const ROLE_VAR_DIRS: &[&str] = &["defaults", "vars"];

/// Directory names holding inventories.
const INVENTORY_DIRS: &[&str] = &["inventory", "inventories"];

/// Directory names holding variable files.
const VAR_DIRS: &[&str] = &["group_vars", "host_vars"];

/// Splits a relative path into segments, or `None` if any segment is not
/// valid UTF-8.
fn components(relative: &Path) -> Option<Vec<&str>> {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_str()),
            _ => None,
        })
        .collect()
}

fn is_yaml(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".yml") || lower.ends_with(".yaml")
}

fn has_extension(name: &str) -> bool {
    name.rfind('.').is_some_and(|i| i > 0)
}

fn is_variable_file_name(name: &str) -> bool {
    is_yaml(name) || name.to_ascii_lowercase().ends_with(".json") || !has_extension(name)
}

fn is_inventory_file_name(name: &str) -> bool {
    is_yaml(name) || name.to_ascii_lowercase().ends_with(".ini") || !has_extension(name)
}

fn is_root_inventory(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    (stem == "hosts" || stem == "inventory") && is_inventory_file_name(name)
}

/// Classifies a project entry.
///
/// Returns `None` for entries that are not Ansible artifacts, and for paths
/// that are not valid UTF-8. Tags are never classified here: they are
/// derived from task and playbook contents.
#[must_use]
pub fn classify(relative: &Path, is_dir: bool) -> Option<ArtifactKind> {
    let parts = components(relative)?;
    let (&first, rest) = parts.split_first()?;

    if is_dir {
        return (first == "roles" && rest.len() == 1).then_some(ArtifactKind::Role);
    }

    let file_name = *parts.last()?;

    if first == "roles" {
        // roles/<role>/<section>/.../<file>
        if rest.len() < 3 || !is_yaml(file_name) {
            return None;
        }
        return match rest[1] {
            "tasks" => Some(ArtifactKind::Task),
            section if ROLE_VAR_DIRS.contains(&section) => Some(ArtifactKind::VariableFile),
            _ => None,
        };
    }

    if parts[..parts.len() - 1]
        .iter()
        .any(|dir| VAR_DIRS.contains(dir))
    {
        return is_variable_file_name(file_name).then_some(ArtifactKind::VariableFile);
    }

    if INVENTORY_DIRS.contains(&first) && !rest.is_empty() {
        return is_inventory_file_name(file_name).then_some(ArtifactKind::InventoryFile);
    }

    if first == "playbooks" && !rest.is_empty() {
        return is_yaml(file_name).then_some(ArtifactKind::Playbook);
    }

    if rest.is_empty() {
        if is_root_inventory(file_name) {
            return Some(ArtifactKind::InventoryFile);
        }
        if is_yaml(file_name) && !NON_PLAYBOOK_FILES.contains(&file_name) {
            return Some(ArtifactKind::Playbook);
        }
    }

    None
}

/// Returns the kind that owns anything found under `relative`.
///
/// Used to attribute unreadable entries to the section they live in.
#[must_use]
pub fn owning_kind(relative: &Path) -> Option<ArtifactKind> {
    let parts = components(relative)?;
    let first = *parts.first()?;
    if first == "roles" {
        return Some(ArtifactKind::Role);
    }
    if parts.iter().any(|p| VAR_DIRS.contains(p)) {
        return Some(ArtifactKind::VariableFile);
    }
    if INVENTORY_DIRS.contains(&first) {
        return Some(ArtifactKind::InventoryFile);
    }
    if first == "playbooks" || parts.len() == 1 {
        return Some(ArtifactKind::Playbook);
    }
    None
}

/// Returns true if the walker should descend into a directory.
#[must_use]
pub fn is_relevant_dir(relative: &Path) -> bool {
    let Some(parts) = components(relative) else {
        return false;
    };
    let Some((&first, rest)) = parts.split_first() else {
        return true;
    };
    match first {
        "roles" => match rest {
            [] | [_] => true,
            [_, section, ..] => *section == "tasks" || ROLE_VAR_DIRS.contains(section),
        },
        "playbooks" => true,
        dir if VAR_DIRS.contains(&dir) || INVENTORY_DIRS.contains(&dir) => true,
        _ => false,
    }
}

/// Returns true if a path points at a directory-form inventory section.
#[must_use]
pub fn is_inventory_dir(name: &str) -> bool {
    INVENTORY_DIRS.contains(&name)
}
