//! Locating and loading the configuration for a run.
//!
//! Lookup order: the `--config` file, then `ansible-conform.toml` or
//! `.ansible-conform.toml` in the project root, then `config.toml` in the
//! global directory. Without any of them the built-in defaults apply.

use ansible_conform_core::Config;
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::commands::init::CONFIG_FILE_NAME;

/// Overrides the global config directory (`~/.ansible-conform`).
const CONFIG_DIR_ENV: &str = "ANSIBLE_CONFORM_CONFIG_DIR";

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Where a run's configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`.
    Explicit(PathBuf),
    /// Found in the project root.
    Project(PathBuf),
    /// Found in the global config directory.
    Global(PathBuf),
    /// Nothing found.
    Default,
}

impl ConfigSource {
    fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit(p) => write!(f, "config {}", p.display()),
            Self::Project(p) => write!(f, "project config {}", p.display()),
            Self::Global(p) => write!(f, "global config {}", p.display()),
            Self::Default => write!(f, "default config"),
        }
    }
}

/// Loads the configuration for a project, reporting where it came from.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed. A missing
/// `--config` file is an error; missing project and global files are not.
pub fn load(project_dir: &Path, explicit: Option<&Path>) -> Result<(Config, ConfigSource)> {
    load_from(project_dir, explicit, global_config_dir().as_deref())
}

fn load_from(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<&Path>,
) -> Result<(Config, ConfigSource)> {
    let source = locate(project_dir, explicit, global_dir);
    let config = match source.path() {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => Config::default(),
    };
    tracing::debug!("Using {source}");
    Ok((config, source))
}

fn locate(project_dir: &Path, explicit: Option<&Path>, global_dir: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    [CONFIG_FILE_NAME.to_string(), format!(".{CONFIG_FILE_NAME}")]
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.is_file())
        .map(ConfigSource::Project)
        .or_else(|| {
            global_dir
                .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
                .filter(|candidate| candidate.is_file())
                .map(ConfigSource::Global)
        })
        .unwrap_or(ConfigSource::Default)
}

fn global_config_dir() -> Option<PathBuf> {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".ansible-conform")))
}
