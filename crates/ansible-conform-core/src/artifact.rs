//! Classified project artifacts and the facts parsed from them.

use crate::types::ArtifactRef;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Artifact classification used to route rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// A directory under `roles/`.
    Role,
    /// A playbook file.
    Playbook,
    /// A task file under a role's `tasks/` directory.
    Task,
    /// A variable file (`defaults/`, `vars/`, `group_vars/`, `host_vars/`).
    VariableFile,
    /// A tag used by tasks or plays.
    Tag,
    /// An inventory file.
    InventoryFile,
}

impl ArtifactKind {
    /// Every kind, in classification order.
    pub const ALL: [Self; 6] = [
        Self::Role,
        Self::Playbook,
        Self::Task,
        Self::VariableFile,
        Self::Tag,
        Self::InventoryFile,
    ];
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Role => "role",
            Self::Playbook => "playbook",
            Self::Task => "task",
            Self::VariableFile => "variable-file",
            Self::Tag => "tag",
            Self::InventoryFile => "inventory",
        };
        f.write_str(s)
    }
}

/// A single task parsed from a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEntry {
    /// The task's `name`, if it has one.
    pub name: Option<String>,
    /// Tags attached to the task, including tags inherited from enclosing blocks.
    pub tags: Vec<String>,
    /// Line of the task's name in the source file (0 when unknown).
    pub line: usize,
}

/// A task file together with its parsed tasks, as seen from its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFileSummary {
    /// Path relative to the role's `tasks/` directory.
    pub relative: PathBuf,
    /// Tasks in file order.
    pub tasks: Vec<TaskEntry>,
}

/// Facts about a role directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFacts {
    /// Task files that parsed, sorted by path.
    pub task_files: Vec<TaskFileSummary>,
}

impl RoleFacts {
    /// Total number of tasks across all task files.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.task_files.iter().map(|f| f.tasks.len()).sum()
    }
}

/// A play inside a playbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Play {
    /// The play's `name`.
    pub name: Option<String>,
    /// The play's `hosts` pattern.
    pub hosts: Option<String>,
    /// Roles applied by the play.
    pub roles: Vec<String>,
    /// Play-level tags.
    pub tags: Vec<String>,
    /// Tasks from `pre_tasks`, `tasks`, `post_tasks` and `handlers`.
    pub tasks: Vec<TaskEntry>,
}

/// Facts about a playbook file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybookFacts {
    /// Plays in file order.
    pub plays: Vec<Play>,
}

/// A top-level variable definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEntry {
    /// Variable name.
    pub name: String,
    /// Value, when it is a plain string scalar.
    pub value: Option<String>,
    /// Line of the definition (0 when unknown).
    pub line: usize,
}

/// Facts about a variable file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableFacts {
    /// Variables in file order.
    pub variables: Vec<VariableEntry>,
}

/// Facts about a tag, gathered across the project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFacts {
    /// Files using the tag, sorted and deduplicated.
    pub used_in: Vec<PathBuf>,
}

/// Syntax of an inventory file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryFormat {
    /// INI-style inventory.
    #[default]
    Ini,
    /// YAML inventory.
    Yaml,
}

/// Facts about an inventory file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryFacts {
    /// Detected format.
    pub format: InventoryFormat,
    /// Group names in declaration order.
    pub groups: Vec<String>,
}

/// The classification of an artifact together with its parsed facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// Role directory.
    Role(RoleFacts),
    /// Playbook file.
    Playbook(PlaybookFacts),
    /// Role task file.
    Task(Vec<TaskEntry>),
    /// Variable file.
    VariableFile(VariableFacts),
    /// Tag.
    Tag(TagFacts),
    /// Inventory file.
    InventoryFile(InventoryFacts),
}

impl Classified {
    /// Returns an empty set of facts for a kind.
    #[must_use]
    pub fn empty(kind: ArtifactKind) -> Self {
        match kind {
            ArtifactKind::Role => Self::Role(RoleFacts::default()),
            ArtifactKind::Playbook => Self::Playbook(PlaybookFacts::default()),
            ArtifactKind::Task => Self::Task(Vec::new()),
            ArtifactKind::VariableFile => Self::VariableFile(VariableFacts::default()),
            ArtifactKind::Tag => Self::Tag(TagFacts::default()),
            ArtifactKind::InventoryFile => Self::InventoryFile(InventoryFacts::default()),
        }
    }

    /// Returns the kind of this classification.
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        match self {
            Self::Role(_) => ArtifactKind::Role,
            Self::Playbook(_) => ArtifactKind::Playbook,
            Self::Task(_) => ArtifactKind::Task,
            Self::VariableFile(_) => ArtifactKind::VariableFile,
            Self::Tag(_) => ArtifactKind::Tag,
            Self::InventoryFile(_) => ArtifactKind::InventoryFile,
        }
    }
}

/// A problem found while scanning an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Defect {
    /// The artifact could not be parsed into the expected structure.
    Malformed(String),
    /// The artifact could not be read.
    Unreadable(String),
}

/// A classified filesystem entity, snapshotted at scan time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path relative to the project root.
    pub path: PathBuf,
    /// Display name.
    pub name: String,
    /// Classification and parsed facts.
    pub class: Classified,
    /// Scan-time problem, if any. Facts are empty when set.
    pub defect: Option<Defect>,
}

impl Artifact {
    /// Creates a healthy artifact.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, class: Classified) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            class,
            defect: None,
        }
    }

    /// Creates an artifact whose content did not parse.
    #[must_use]
    pub fn malformed(
        kind: ArtifactKind,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            class: Classified::empty(kind),
            defect: Some(Defect::Malformed(message.into())),
        }
    }

    /// Creates an artifact that could not be read.
    #[must_use]
    pub fn unreadable(
        kind: ArtifactKind,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            class: Classified::empty(kind),
            defect: Some(Defect::Unreadable(message.into())),
        }
    }

    /// Returns the artifact kind.
    #[must_use]
    pub fn kind(&self) -> ArtifactKind {
        self.class.kind()
    }

    /// Returns the path relative to the project root.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the artifact carries a scan-time defect.
    #[must_use]
    pub fn is_defective(&self) -> bool {
        self.defect.is_some()
    }

    /// Builds the reference stored in findings.
    #[must_use]
    pub fn reference(&self) -> ArtifactRef {
        ArtifactRef {
            kind: self.kind(),
            path: self.path.clone(),
            name: self.name.clone(),
        }
    }
}
