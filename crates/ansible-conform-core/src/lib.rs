//! # ansible-conform-core
//!
//! Core framework for checking Ansible projects against naming and layout
//! conventions.
//!
//! The pipeline is a single linear pass:
//!
//! - [`ProjectScanner`] walks a project tree and yields classified [`Artifact`]s
//! - [`RuleRegistry`] holds the [`Rule`]s, built once and passed explicitly
//! - [`Evaluator`] applies the applicable rules and produces [`Finding`]s
//! - [`Report`] aggregates findings and renders them as text, JSON or compact lines
//!
//! ## Example
//!
//! ```ignore
//! use ansible_conform_core::{Evaluator, ProjectScanner, ReportFormat, RuleRegistry};
//!
//! let registry = RuleRegistry::builder().rule(MyRule).build()?;
//! let scanner = ProjectScanner::builder().root(".").build()?;
//!
//! let report = Evaluator::new(&registry).run(&scanner)?;
//! report.write_to(std::io::stdout(), ReportFormat::Text)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod builtin;
mod config;
mod evaluator;
mod registry;
mod report;
mod rule;
mod types;

/// Project tree walking and artifact classification.
pub mod scanner;

pub use artifact::{
    Artifact, ArtifactKind, Classified, Defect, InventoryFacts, InventoryFormat, Play,
    PlaybookFacts, RoleFacts, TagFacts, TaskEntry, TaskFileSummary, VariableEntry, VariableFacts,
};
pub use builtin::{MalformedArtifact, UnreadablePath, MALFORMED_ARTIFACT, UNREADABLE_PATH};
pub use config::{Config, ConfigError, RuleConfig, ScannerConfig};
pub use evaluator::Evaluator;
pub use registry::{RegisteredRule, RegistryBuilder, RegistryError, RuleRegistry};
pub use report::{Report, ReportError, ReportFormat, Summary};
pub use rule::{Failure, Rule, RuleBox, RuleTarget, Verdict};
pub use scanner::{Artifacts, ProjectScanner, ScanError, ScannerBuilder};
pub use types::{ArtifactRef, Finding, Location, Outcome, Severity, Suggestion};
