//! Extraction of structural facts from task, playbook, variable and
//! inventory files.
//!
//! Parsers return `Err(message)` when the content does not have the shape its
//! location implies; the scanner turns that into a malformed artifact.

use crate::artifact::{
    InventoryFacts, InventoryFormat, Play, PlaybookFacts, TaskEntry, VariableEntry, VariableFacts,
};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Keys whose values are nested task lists.
const BLOCK_KEYS: &[&str] = &["block", "rescue", "always"];

/// Play keys whose values are task lists.
const PLAY_TASK_KEYS: &[&str] = &["pre_tasks", "tasks", "post_tasks", "handlers"];

/// Finds source lines for parsed values, scanning forward so repeated
/// names resolve in document order.
struct LineLocator<'a> {
    lines: Vec<&'a str>,
    next: usize,
}

impl<'a> LineLocator<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().collect(),
            next: 0,
        }
    }

    /// Returns the 1-indexed line of the next `name:` key holding `name`.
    fn task_name(&mut self, name: &str) -> usize {
        for (i, line) in self.lines.iter().enumerate().skip(self.next) {
            let trimmed = line.trim_start().trim_start_matches("- ").trim_start();
            if let Some(value) = trimmed.strip_prefix("name:") {
                if unquote(strip_comment(value.trim())) == name {
                    self.next = i + 1;
                    return i + 1;
                }
            }
        }
        0
    }

    /// Returns the 1-indexed line of a top-level `key:` definition.
    fn top_level_key(&self, key: &str) -> usize {
        self.lines
            .iter()
            .position(|line| {
                let Some(rest) = line
                    .strip_prefix(key)
                    .or_else(|| line.strip_prefix(&format!("\"{key}\"")))
                    .or_else(|| line.strip_prefix(&format!("'{key}'")))
                else {
                    return false;
                };
                rest.trim_start().starts_with(':')
            })
            .map_or(0, |i| i + 1)
    }
}

/// Drops a trailing ` # comment` from a scalar, leaving quoted text intact.
fn strip_comment(value: &str) -> &str {
    if let Some(quote) = value.chars().next().filter(|c| matches!(c, '"' | '\'')) {
        return value[1..]
            .find(quote)
            .map_or(value, |end| &value[..end + 2]);
    }
    value
        .find(" #")
        .or_else(|| value.find("\t#"))
        .map_or(value, |i| value[..i].trim_end())
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
}

fn load(content: &str) -> Result<Value, String> {
    let is_empty = content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    });
    if is_empty {
        return Ok(Value::Null);
    }
    serde_yaml::from_str::<Value>(content).map_err(|e| e.to_string())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a `tags` value: a list, or a comma-separated string.
fn parse_tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        Some(other) => scalar_to_string(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn collect_tasks(
    items: &[Value],
    inherited: &[String],
    locator: &mut LineLocator<'_>,
    out: &mut Vec<TaskEntry>,
) -> Result<(), String> {
    for (index, item) in items.iter().enumerate() {
        let Value::Mapping(map) = item else {
            return Err(format!("task #{} is not a mapping", index + 1));
        };

        let mut tags = inherited.to_vec();
        for tag in parse_tags(map.get("tags")) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        let name = map.get("name").and_then(scalar_to_string);
        let line = name.as_deref().map_or(0, |n| locator.task_name(n));

        let nested: Vec<&Value> = BLOCK_KEYS.iter().filter_map(|k| map.get(*k)).collect();
        if nested.is_empty() {
            out.push(TaskEntry { name, tags, line });
            continue;
        }
        for section in nested {
            match section {
                Value::Sequence(children) => collect_tasks(children, &tags, locator, out)?,
                Value::Null => {}
                _ => return Err(format!("block in task #{} is not a list", index + 1)),
            }
        }
    }
    Ok(())
}

/// Parses a role task file into its tasks, flattening blocks.
///
/// # Errors
///
/// Returns a message if the YAML is invalid or is not a list of task mappings.
pub fn parse_tasks(content: &str) -> Result<Vec<TaskEntry>, String> {
    let mut tasks = Vec::new();
    match load(content)? {
        Value::Null => {}
        Value::Sequence(items) => {
            let mut locator = LineLocator::new(content);
            collect_tasks(&items, &[], &mut locator, &mut tasks)?;
        }
        _ => return Err("expected a list of tasks".to_string()),
    }
    Ok(tasks)
}

fn parse_hosts(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Sequence(items) => Some(
            items
                .iter()
                .filter_map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => scalar_to_string(other),
    }
}

fn parse_roles(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Sequence(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Mapping(map) => map
                .get("role")
                .or_else(|| map.get("name"))
                .and_then(scalar_to_string),
            other => scalar_to_string(other),
        })
        .collect()
}

fn parse_play(
    index: usize,
    map: &Mapping,
    locator: &mut LineLocator<'_>,
) -> Result<Play, String> {
    let mut play = Play {
        name: map.get("name").and_then(scalar_to_string),
        hosts: parse_hosts(map.get("hosts")),
        roles: parse_roles(map.get("roles")),
        tags: parse_tags(map.get("tags")),
        tasks: Vec::new(),
    };
    if let Some(name) = &play.name {
        locator.task_name(name);
    }
    for key in PLAY_TASK_KEYS {
        match map.get(*key) {
            Some(Value::Sequence(items)) => collect_tasks(items, &[], locator, &mut play.tasks)?,
            Some(Value::Null) | None => {}
            Some(_) => return Err(format!("`{key}` in play #{} is not a list", index + 1)),
        }
    }
    Ok(play)
}

/// Parses a playbook into its plays.
///
/// # Errors
///
/// Returns a message if the YAML is invalid or is not a list of plays.
pub fn parse_playbook(content: &str) -> Result<PlaybookFacts, String> {
    let mut facts = PlaybookFacts::default();
    match load(content)? {
        Value::Null => {}
        Value::Sequence(items) => {
            let mut locator = LineLocator::new(content);
            for (index, item) in items.iter().enumerate() {
                let Value::Mapping(map) = item else {
                    return Err(format!("play #{} is not a mapping", index + 1));
                };
                facts.plays.push(parse_play(index, map, &mut locator)?);
            }
        }
        _ => return Err("expected a list of plays".to_string()),
    }
    Ok(facts)
}

/// Parses a variable file into its top-level variables.
///
/// # Errors
///
/// Returns a message if the YAML is invalid or is not a mapping with string keys.
pub fn parse_variables(content: &str) -> Result<VariableFacts, String> {
    let mut facts = VariableFacts::default();
    match load(content)? {
        Value::Null => {}
        Value::Mapping(map) => {
            let locator = LineLocator::new(content);
            for (key, value) in &map {
                let Some(name) = key.as_str() else {
                    return Err(format!("variable name {key:?} is not a string"));
                };
                facts.variables.push(VariableEntry {
                    name: name.to_string(),
                    value: value.as_str().map(String::from),
                    line: locator.top_level_key(name),
                });
            }
        }
        _ => return Err("expected a mapping of variables".to_string()),
    }
    Ok(facts)
}

fn yaml_groups(map: &Mapping, out: &mut Vec<String>) {
    for (key, value) in map {
        let Some(group) = key.as_str() else { continue };
        if !out.iter().any(|g| g == group) {
            out.push(group.to_string());
        }
        if let Some(Value::Mapping(children)) = value.get("children") {
            yaml_groups(children, out);
        }
    }
}

fn ini_groups(content: &str) -> Result<Vec<String>, String> {
    let mut groups: Vec<String> = Vec::new();
    for (i, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if !line.starts_with('[') {
            continue;
        }
        let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) else {
            return Err(format!("unterminated section header on line {}", i + 1));
        };
        let group = header.split(':').next().unwrap_or(header).trim();
        if group.is_empty() {
            return Err(format!("empty section header on line {}", i + 1));
        }
        if !groups.iter().any(|g| g == group) {
            groups.push(group.to_string());
        }
    }
    Ok(groups)
}

/// Parses an inventory file, picking the format from the file extension.
///
/// # Errors
///
/// Returns a message if the inventory cannot be parsed.
pub fn parse_inventory(path: &Path, content: &str) -> Result<InventoryFacts, String> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "yml" | "yaml"));

    if !is_yaml {
        return Ok(InventoryFacts {
            format: InventoryFormat::Ini,
            groups: ini_groups(content)?,
        });
    }

    let mut groups = Vec::new();
    match load(content)? {
        Value::Null => {}
        Value::Mapping(map) => yaml_groups(&map, &mut groups),
        _ => return Err("expected a mapping of groups".to_string()),
    }
    Ok(InventoryFacts {
        format: InventoryFormat::Yaml,
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_with_names_tags_and_lines() {
        let content = "---
- name: Install nginx
  ansible.builtin.package:
    name: nginx
  tags: [web, Packages]

- name: \"Start nginx\"
  ansible.builtin.service:
    name: nginx
    state: started
  tags: web,service
";
        let tasks = parse_tasks(content).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name.as_deref(), Some("Install nginx"));
        assert_eq!(tasks[0].tags, vec!["web", "Packages"]);
        assert_eq!(tasks[0].line, 2);
        assert_eq!(tasks[1].name.as_deref(), Some("Start nginx"));
        assert_eq!(tasks[1].tags, vec!["web", "service"]);
        assert_eq!(tasks[1].line, 7);
    }

    #[test]
    fn task_lines_ignore_trailing_comments() {
        let content = "\
- name: check connectivity  # smoke test
  ansible.builtin.ping:
- name: \"Report # of hosts\" # quoted
  ansible.builtin.debug:
    msg: done
";
        let tasks = parse_tasks(content).unwrap();
        assert_eq!(tasks[0].name.as_deref(), Some("check connectivity"));
        assert_eq!(tasks[0].line, 1);
        assert_eq!(tasks[1].name.as_deref(), Some("Report # of hosts"));
        assert_eq!(tasks[1].line, 3);
    }

    #[test]
    fn blocks_are_flattened_and_pass_tags_down() {
        let content = "
- name: Configure
  tags: debug
  block:
    - name: Render config
      ansible.builtin.template:
        src: a.j2
        dest: /etc/a
    - name: Validate config
      ansible.builtin.command: a --check
  rescue:
    - name: Roll back
      ansible.builtin.debug:
        msg: failed
- ansible.builtin.meta: flush_handlers
";
        let tasks = parse_tasks(content).unwrap();
        let names: Vec<Option<&str>> = tasks.iter().map(|t| t.name.as_deref()).collect();
        assert_eq!(
            names,
            vec![
                Some("Render config"),
                Some("Validate config"),
                Some("Roll back"),
                None
            ]
        );
        assert!(tasks[..3].iter().all(|t| t.tags == vec!["debug"]));
        assert!(tasks[3].tags.is_empty());
    }

    #[test]
    fn empty_task_file_has_no_tasks() {
        assert!(parse_tasks("").unwrap().is_empty());
        assert!(parse_tasks("---\n").unwrap().is_empty());
    }

    #[test]
    fn task_file_must_be_a_list() {
        assert_eq!(
            parse_tasks("name: Not a list\n").unwrap_err(),
            "expected a list of tasks"
        );
        assert_eq!(
            parse_tasks("- just a string\n").unwrap_err(),
            "task #1 is not a mapping"
        );
        assert!(parse_tasks("- name: [unclosed\n").is_err());
    }

    #[test]
    fn playbook_plays() {
        let content = "
- name: Web servers
  hosts: [web, lb]
  tags: site
  roles:
    - common
    - role: nginx
      tags: nginx
  tasks:
    - name: Check connectivity
      ansible.builtin.ping:
- ansible.builtin.import_playbook: db.yml
";
        let facts = parse_playbook(content).unwrap();
        assert_eq!(facts.plays.len(), 2);
        let web = &facts.plays[0];
        assert_eq!(web.name.as_deref(), Some("Web servers"));
        assert_eq!(web.hosts.as_deref(), Some("web,lb"));
        assert_eq!(web.roles, vec!["common", "nginx"]);
        assert_eq!(web.tags, vec!["site"]);
        assert_eq!(web.tasks.len(), 1);
        assert_eq!(web.tasks[0].line, 10);
        assert!(facts.plays[1].hosts.is_none());
    }

    #[test]
    fn playbook_must_be_a_list_of_plays() {
        assert!(parse_playbook("hosts: all\n").is_err());
        assert!(parse_playbook("- hosts: all\n  tasks: nope\n").is_err());
    }

    #[test]
    fn variables_with_values_and_lines() {
        let content = "---
app_port: 8080
app_data_dir: /srv/app
\"quoted_name\": yes
App_Mode: production
";
        let facts = parse_variables(content).unwrap();
        let names: Vec<&str> = facts.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["app_port", "app_data_dir", "quoted_name", "App_Mode"]);
        assert_eq!(facts.variables[0].value, None);
        assert_eq!(facts.variables[1].value.as_deref(), Some("/srv/app"));
        assert_eq!(facts.variables[1].line, 3);
        assert_eq!(facts.variables[2].line, 4);
        assert_eq!(facts.variables[3].line, 5);
    }

    #[test]
    fn variables_must_be_a_mapping() {
        assert_eq!(
            parse_variables("- a\n- b\n").unwrap_err(),
            "expected a mapping of variables"
        );
        assert!(parse_variables("1: one\n").is_err());
    }

    #[test]
    fn ini_inventory_groups() {
        let content = "
db1.example.com

[web]
web1.example.com

[web:vars]
http_port=80

[prod:children]
web
";
        let facts = parse_inventory(Path::new("hosts"), content).unwrap();
        assert_eq!(facts.format, InventoryFormat::Ini);
        assert_eq!(facts.groups, vec!["web", "prod"]);
        assert!(parse_inventory(Path::new("hosts.ini"), "[web\nhost\n").is_err());
    }

    #[test]
    fn yaml_inventory_groups() {
        let content = "
all:
  children:
    web:
      hosts:
        web1.example.com:
    db:
      hosts:
        db1.example.com:
";
        let facts = parse_inventory(Path::new("inventory.yml"), content).unwrap();
        assert_eq!(facts.format, InventoryFormat::Yaml);
        assert_eq!(facts.groups, vec!["all", "web", "db"]);
    }
}
