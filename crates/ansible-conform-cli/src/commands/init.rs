//! Init command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;

/// File written by `init`.
pub const CONFIG_FILE_NAME: &str = "ansible-conform.toml";

const DEFAULT_CONFIG: &str = r#"# ansible-conform configuration

# Lowest failure severity that makes `check` exit non-zero ("warning" or "error")
fail_on = "error"

[scanner]
# Glob patterns (relative to the project root) to exclude from scanning
exclude = [
    "**/.git/**",
    "**/molecule/**",
]

# Respect .gitignore files
respect_gitignore = true

# Evaluate artifacts in parallel
parallel = false

# Rule configurations
# Each rule can be enabled/disabled and have its severity overridden.
# malformed-artifact (AC900) and unreadable-path (AC901) are always active.

[rules.role-name-lowercase-alphanumeric]
enabled = true

[rules.role-name-starts-with-letter]
enabled = true

[rules.max-40-tasks-per-role]
enabled = true
# severity = "warning"  # Override default severity
max_tasks = 40
debug_tag = "debug"

[rules.task-name-starts-uppercase]
enabled = true

[rules.tag-name-lowercase]
enabled = true

[rules.variable-name-lowercase]
enabled = true

[rules.directory-path-trailing-slash]
enabled = true
suffixes = ["_dir", "_directory"]
"#;

/// Runs the init command, writing the default config into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!("Created {CONFIG_FILE_NAME}");
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_FILE_NAME} to configure rules");
    println!("  2. Run: ansible-conform check");

    Ok(())
}
