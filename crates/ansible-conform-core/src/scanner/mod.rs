//! Project scanner: walks an Ansible project tree and yields classified
//! artifacts.
//!
//! Scanning is lazy. [`ProjectScanner::scan`] validates the layout and
//! returns an [`Artifacts`] iterator that walks the tree as it is consumed.
//! Every call re-walks the tree; nothing is cached between scans.

mod classify;
mod parse;

pub use classify::{classify, is_relevant_dir, owning_kind};
pub use parse::{parse_inventory, parse_playbook, parse_tasks, parse_variables};

use crate::artifact::{
    Artifact, ArtifactKind, Classified, Defect, RoleFacts, TagFacts, TaskFileSummary,
};
use crate::config::ScannerConfig;

use miette::Diagnostic;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a scan.
#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    /// The root holds no roles, playbooks or inventories.
    #[error("No Ansible project structure found at {}", root.display())]
    #[diagnostic(
        code(ansible_conform::invalid_project_layout),
        help("expected a roles/ or playbooks/ directory, a playbook such as site.yml, or an inventory (hosts, inventory/)")
    )]
    InvalidProjectLayout {
        /// The scanned root.
        root: PathBuf,
    },

    /// The project root itself could not be read.
    #[error("Cannot read project root {}: {source}", path.display())]
    #[diagnostic(code(ansible_conform::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// An exclude pattern is not a valid glob.
    #[error("Invalid exclude pattern: {0}")]
    #[diagnostic(code(ansible_conform::exclude_pattern))]
    Pattern(#[from] glob::PatternError),
}

/// Builder for configuring a [`ProjectScanner`].
#[derive(Debug, Default)]
pub struct ScannerBuilder {
    root: Option<PathBuf>,
    exclude_patterns: Vec<String>,
    respect_gitignore: Option<bool>,
}

impl ScannerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project root.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Adds an exclude glob pattern, matched against root-relative paths.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets whether `.gitignore` files are honored (default: true).
    #[must_use]
    pub fn respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = Some(respect);
        self
    }

    /// Applies scanner settings from configuration.
    #[must_use]
    pub fn config(mut self, config: &ScannerConfig) -> Self {
        self.exclude_patterns.extend(config.exclude.iter().cloned());
        if self.respect_gitignore.is_none() {
            self.respect_gitignore = Some(config.respect_gitignore);
        }
        self
    }

    /// Builds the scanner.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is invalid or the current
    /// directory cannot be resolved for a relative root.
    pub fn build(self) -> Result<ProjectScanner, ScanError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()
                .map_err(|source| ScanError::Io {
                    path: root.clone(),
                    source,
                })?
                .join(&root)
        };

        let exclude = self
            .exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ProjectScanner {
            root,
            exclude,
            respect_gitignore: self.respect_gitignore.unwrap_or(true),
        })
    }
}

/// Walks a project root and classifies what it finds.
///
/// Use [`ProjectScanner::builder()`] to construct an instance.
#[derive(Debug, Clone)]
pub struct ProjectScanner {
    root: PathBuf,
    exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
}

impl ProjectScanner {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates the layout and starts a fresh walk.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Io`] if the root cannot be read and
    /// [`ScanError::InvalidProjectLayout`] if it holds no roles, playbooks
    /// or inventories.
    pub fn scan(&self) -> Result<Artifacts<'_>, ScanError> {
        info!("Scanning project at {}", self.root.display());
        self.check_layout()?;
        Ok(Artifacts::new(self))
    }

    fn check_layout(&self) -> Result<(), ScanError> {
        let entries = std::fs::read_dir(&self.root).map_err(|source| ScanError::Io {
            path: self.root.clone(),
            source,
        })?;

        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            let relative = Path::new(name);
            if is_excluded(&self.exclude, relative) {
                continue;
            }
            let recognized = if entry.path().is_dir() {
                name == "roles" || name == "playbooks" || classify::is_inventory_dir(name)
            } else {
                matches!(
                    classify(relative, false),
                    Some(ArtifactKind::Playbook | ArtifactKind::InventoryFile)
                )
            };
            if recognized {
                debug!("Recognized project entry: {name}");
                return Ok(());
            }
        }

        Err(ScanError::InvalidProjectLayout {
            root: self.root.clone(),
        })
    }

    fn walk(&self) -> ignore::Walk {
        let root = self.root.clone();
        let exclude = self.exclude.clone();
        let respect = self.respect_gitignore;

        let mut builder = ignore::WalkBuilder::new(&self.root);
        builder
            .hidden(true)
            .git_ignore(respect)
            .git_global(respect)
            .git_exclude(respect)
            .ignore(respect)
            .parents(respect)
            .require_git(false)
            .follow_links(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                let Ok(relative) = entry.path().strip_prefix(&root) else {
                    return true;
                };
                if relative.as_os_str().is_empty() {
                    return true;
                }
                if is_excluded(&exclude, relative) {
                    return false;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                if relative.to_str().is_none() {
                    // Only the outermost non-UTF-8 entry is reported.
                    let parent_valid = relative.parent().is_some_and(|p| p.to_str().is_some());
                    return parent_valid && is_relevant_entry(&lossy(relative), is_dir);
                }
                !is_dir || is_relevant_dir(relative)
            });
        builder.build()
    }
}

/// Checks a root-relative path against exclude patterns.
///
/// Patterns are matched as globs, and also as plain path segments so that
/// `**/molecule/**` prunes the `molecule` directory itself.
fn is_excluded(patterns: &[glob::Pattern], relative: &Path) -> bool {
    let rel = relative.to_string_lossy().replace('\\', "/");
    let wrapped = format!("/{rel}/");
    patterns.iter().any(|pattern| {
        if pattern.matches(&rel) {
            return true;
        }
        let normalized = pattern.as_str().replace("**", "");
        let segment = normalized.trim_matches('/');
        !segment.is_empty() && !segment.contains('*') && wrapped.contains(&format!("/{segment}/"))
    })
}

/// Replaces invalid UTF-8 in a path so it can be classified and displayed.
fn lossy(relative: &Path) -> PathBuf {
    PathBuf::from(relative.to_string_lossy().into_owned())
}

fn is_relevant_entry(relative: &Path, is_dir: bool) -> bool {
    classify(relative, is_dir).is_some() || (is_dir && is_relevant_dir(relative))
}

fn file_name(relative: &Path) -> String {
    relative
        .file_name()
        .map_or_else(|| relative.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn read(path: &Path) -> Result<String, Defect> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            Defect::Malformed("file is not valid UTF-8".to_string())
        } else {
            Defect::Unreadable(e.to_string())
        }
    })
}

fn defective(kind: ArtifactKind, relative: PathBuf, name: String, defect: Defect) -> Artifact {
    Artifact {
        path: relative,
        name,
        class: Classified::empty(kind),
        defect: Some(defect),
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}

/// A role directory whose task files are still being walked.
struct OpenRole {
    name: String,
    path: PathBuf,
    task_files: Vec<TaskFileSummary>,
    unreadable: Option<String>,
}

impl OpenRole {
    fn into_artifact(mut self) -> Artifact {
        if let Some(message) = self.unreadable {
            return defective(
                ArtifactKind::Role,
                self.path,
                self.name,
                Defect::Unreadable(message),
            );
        }
        self.task_files.sort_by(|a, b| a.relative.cmp(&b.relative));
        Artifact::new(
            self.path,
            self.name,
            Classified::Role(RoleFacts {
                task_files: self.task_files,
            }),
        )
    }
}

/// Lazy sequence of artifacts produced by one scan.
///
/// File artifacts are yielded as the walk reaches them. A role is yielded
/// once the walk leaves its directory; tags are yielded after the walk ends.
pub struct Artifacts<'a> {
    scanner: &'a ProjectScanner,
    walk: ignore::Walk,
    open_role: Option<OpenRole>,
    tags: BTreeMap<String, BTreeSet<PathBuf>>,
    pending: VecDeque<Artifact>,
    done: bool,
}

impl<'a> Artifacts<'a> {
    fn new(scanner: &'a ProjectScanner) -> Self {
        Self {
            scanner,
            walk: scanner.walk(),
            open_role: None,
            tags: BTreeMap::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.scanner.root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf)
    }

    fn close_role(&mut self) {
        if let Some(role) = self.open_role.take() {
            self.pending.push_back(role.into_artifact());
        }
    }

    fn close_role_outside(&mut self, relative: &Path) {
        let inside = self
            .open_role
            .as_ref()
            .is_some_and(|role| relative.starts_with(&role.path));
        if !inside {
            self.close_role();
        }
    }

    fn record_tags<'t>(&mut self, file: &Path, tags: impl IntoIterator<Item = &'t String>) {
        for tag in tags {
            self.tags
                .entry(tag.clone())
                .or_default()
                .insert(file.to_path_buf());
        }
    }

    fn emit_tags(&mut self) {
        for (tag, files) in std::mem::take(&mut self.tags) {
            let used_in: Vec<PathBuf> = files.into_iter().collect();
            let Some(first) = used_in.first().cloned() else {
                continue;
            };
            self.pending.push_back(Artifact::new(
                first,
                tag,
                Classified::Tag(TagFacts { used_in }),
            ));
        }
    }

    fn visit(&mut self, entry: &ignore::DirEntry) {
        let relative = self.relative(entry.path());
        if relative.as_os_str().is_empty() {
            return;
        }
        self.close_role_outside(&relative);

        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        if relative.to_str().is_none() {
            self.visit_invalid_name(&relative, is_dir);
            return;
        }
        let Some(kind) = classify(&relative, is_dir) else {
            return;
        };
        debug!("Classified {} as {kind}", relative.display());

        match kind {
            ArtifactKind::Role => {
                self.close_role();
                self.open_role = Some(OpenRole {
                    name: file_name(&relative),
                    path: relative,
                    task_files: Vec::new(),
                    unreadable: None,
                });
            }
            ArtifactKind::Task => self.visit_task_file(entry.path(), relative),
            ArtifactKind::Playbook | ArtifactKind::VariableFile | ArtifactKind::InventoryFile => {
                self.visit_file(kind, entry.path(), relative);
            }
            // Tags are derived from file contents, never from paths.
            ArtifactKind::Tag => {}
        }
    }

    /// Reports an entry whose path is not valid UTF-8. Its subtree is not
    /// walked.
    fn visit_invalid_name(&mut self, relative: &Path, is_dir: bool) {
        let display = lossy(relative);
        let kind = classify(&display, is_dir)
            .or_else(|| owning_kind(&display))
            .unwrap_or(ArtifactKind::Playbook);
        let shown = display.display();
        warn!("Path is not valid UTF-8: {}", shown);
        let name = file_name(&display);
        self.pending.push_back(Artifact::malformed(
            kind,
            display,
            name,
            "path is not valid UTF-8",
        ));
    }

    fn visit_task_file(&mut self, path: &Path, relative: PathBuf) {
        let name = file_name(&relative);
        let content = match read(path) {
            Ok(content) => content,
            Err(defect) => {
                warn!("Cannot read task file {}: {defect:?}", relative.display());
                self.pending
                    .push_back(defective(ArtifactKind::Task, relative, name, defect));
                return;
            }
        };

        match parse_tasks(&content) {
            Ok(tasks) => {
                self.record_tags(&relative, tasks.iter().flat_map(|t| t.tags.iter()));
                if let Some(role) = self.open_role.as_mut() {
                    let tasks_dir = role.path.join("tasks");
                    if let Ok(inner) = relative.strip_prefix(&tasks_dir) {
                        role.task_files.push(TaskFileSummary {
                            relative: inner.to_path_buf(),
                            tasks: tasks.clone(),
                        });
                    }
                }
                self.pending
                    .push_back(Artifact::new(relative, name, Classified::Task(tasks)));
            }
            Err(message) => {
                warn!("Malformed task file {}: {message}", relative.display());
                self.pending.push_back(Artifact::malformed(
                    ArtifactKind::Task,
                    relative,
                    name,
                    message,
                ));
            }
        }
    }

    fn visit_file(&mut self, kind: ArtifactKind, path: &Path, relative: PathBuf) {
        let name = file_name(&relative);
        let content = match read(path) {
            Ok(content) => content,
            Err(defect) => {
                warn!("Cannot read {kind} {}: {defect:?}", relative.display());
                self.pending
                    .push_back(defective(kind, relative, name, defect));
                return;
            }
        };

        let parsed = match kind {
            ArtifactKind::Playbook => parse_playbook(&content).map(Classified::Playbook),
            ArtifactKind::VariableFile => parse_variables(&content).map(Classified::VariableFile),
            ArtifactKind::InventoryFile => {
                parse_inventory(&relative, &content).map(Classified::InventoryFile)
            }
            ArtifactKind::Role | ArtifactKind::Task | ArtifactKind::Tag => return,
        };

        match parsed {
            Ok(class) => {
                if let Classified::Playbook(facts) = &class {
                    let tags = facts
                        .plays
                        .iter()
                        .flat_map(|play| play.tags.iter().chain(play.tasks.iter().flat_map(|t| t.tags.iter())));
                    self.record_tags(&relative, tags);
                }
                self.pending.push_back(Artifact::new(relative, name, class));
            }
            Err(message) => {
                warn!("Malformed {kind} {}: {message}", relative.display());
                self.pending
                    .push_back(Artifact::malformed(kind, relative, name, message));
            }
        }
    }

    fn visit_error(&mut self, err: &ignore::Error) {
        let message = err
            .io_error()
            .map_or_else(|| err.to_string(), ToString::to_string);

        let Some(path) = error_path(err) else {
            // Errors without a path are attributed to the project root.
            warn!("Walk error: {err}");
            self.pending.push_back(Artifact::unreadable(
                ArtifactKind::Playbook,
                ".",
                ".",
                message,
            ));
            return;
        };

        let relative = self.relative(path);
        warn!("Cannot read {}: {message}", relative.display());

        if let Some(role) = self.open_role.as_mut() {
            if role.path == relative {
                role.unreadable = Some(message);
                return;
            }
        }
        self.close_role_outside(&relative);

        let relative = lossy(&relative);
        let kind = classify(&relative, path.is_dir())
            .or_else(|| owning_kind(&relative))
            .unwrap_or(ArtifactKind::Playbook);
        let name = file_name(&relative);
        self.pending
            .push_back(Artifact::unreadable(kind, relative, name, message));
    }
}

impl Iterator for Artifacts<'_> {
    type Item = Artifact;

    fn next(&mut self) -> Option<Artifact> {
        loop {
            if let Some(artifact) = self.pending.pop_front() {
                return Some(artifact);
            }
            if self.done {
                return None;
            }
            match self.walk.next() {
                Some(Ok(entry)) => self.visit(&entry),
                Some(Err(err)) => self.visit_error(&err),
                None => {
                    self.close_role();
                    self.emit_tags();
                    self.done = true;
                }
            }
        }
    }
}
