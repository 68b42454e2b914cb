//! List rules command implementation.

use ansible_conform_core::RuleRegistry;
use ansible_conform_rules::default_registry;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::config_resolver;

/// Formats the registry as a table, with effective severities.
fn render(registry: &RuleRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available rules:\n");
    let _ = writeln!(
        out,
        "{:<7} {:<34} {:<10} {:<9} Description",
        "Code", "Name", "Target", "Severity"
    );
    let _ = writeln!(out, "{}", "-".repeat(100));

    for registered in registry.list_rules() {
        let rule = registered.rule();
        let _ = writeln!(
            out,
            "{:<7} {:<34} {:<10} {:<9} {}",
            rule.code(),
            rule.name(),
            rule.target().to_string(),
            registered.severity().to_string(),
            rule.description()
        );
    }

    let _ = writeln!(out, "\nAC900 and AC901 are always active.");
    let _ = writeln!(out, "\nUse --rules to filter specific rules, e.g.:");
    let _ = writeln!(
        out,
        "  ansible-conform check --rules role-name-lowercase-alphanumeric,tag-name-lowercase"
    );
    let _ = write!(out, "  ansible-conform check --rules AC001,AC003");
    out
}

/// Runs the list-rules command.
pub fn run(project_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let (config, _) = config_resolver::load(project_dir, config_path)?;
    let registry = default_registry(&config, None).context("Failed to build rule registry")?;
    println!("{}", render(&registry));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ansible_conform_core::Config;

    #[test]
    fn lists_every_rule_with_severity() {
        let registry = default_registry(&Config::default(), None).unwrap();
        let table = render(&registry);
        assert!(table.contains("AC001   role-name-lowercase-alphanumeric"));
        assert!(table.contains("AC900   malformed-artifact"));
        let ac004 = table.lines().find(|l| l.starts_with("AC004")).unwrap();
        assert!(ac004.contains("task"));
        assert!(ac004.contains("warning"));
    }
}
