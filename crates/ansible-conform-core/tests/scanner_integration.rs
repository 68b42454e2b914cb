//! Integration test: scanning real project trees end-to-end.
//!
//! Each test builds a throwaway Ansible project with `tempfile` and checks
//! what the scanner yields, or what the evaluator reports for it.

use ansible_conform_core::{
    Artifact, ArtifactKind, Classified, Defect, Evaluator, Failure, ProjectScanner, ReportFormat,
    Rule, RuleRegistry, RuleTarget, ScanError, Verdict,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const WEB_TASKS: &str = "\
- name: Install nginx
  apt:
    name: nginx
  tags: [nginx]
- name: Configure nginx
  template:
    src: nginx.conf.j2
    dest: /etc/nginx/nginx.conf
  tags:
    - nginx
    - config
";

const SITE: &str = "\
- hosts: web
  tags: [web]
  roles:
    - web
";

fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "site.yml", SITE);
    write(root, "hosts", "[web]\nweb1.example.com\n");
    write(root, "group_vars/all.yml", "ntp_server: time.example.com\n");
    write(root, "roles/web/tasks/main.yml", WEB_TASKS);
    write(root, "roles/web/defaults/main.yml", "web_port: 80\n");
    write(root, "roles/web/files/index.html", "<html></html>\n");
    write(root, "README.md", "# project\n");
    dir
}

fn scan(root: &Path) -> Vec<Artifact> {
    ProjectScanner::builder()
        .root(root)
        .build()
        .expect("scanner should build")
        .scan()
        .expect("layout should be valid")
        .collect()
}

fn summary(artifacts: &[Artifact]) -> Vec<(ArtifactKind, String)> {
    artifacts
        .iter()
        .map(|a| (a.kind(), a.path.to_string_lossy().into_owned()))
        .collect()
}

// ── Layout validation ──

#[test]
fn empty_directory_is_invalid_layout() {
    let dir = TempDir::new().unwrap();
    let scanner = ProjectScanner::builder().root(dir.path()).build().unwrap();
    let err = scanner.scan().err().expect("empty dir must be rejected");
    assert!(matches!(err, ScanError::InvalidProjectLayout { .. }));
}

#[test]
fn unrelated_files_are_invalid_layout() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "README.md", "hello\n");
    write(dir.path(), "docs/guide.yml", "title: guide\n");
    let scanner = ProjectScanner::builder().root(dir.path()).build().unwrap();
    assert!(matches!(
        scanner.scan().err(),
        Some(ScanError::InvalidProjectLayout { .. })
    ));
}

#[test]
fn missing_root_is_io_error() {
    let dir = TempDir::new().unwrap();
    let scanner = ProjectScanner::builder()
        .root(dir.path().join("nope"))
        .build()
        .unwrap();
    assert!(matches!(scanner.scan().err(), Some(ScanError::Io { .. })));
}

#[test]
fn single_playbook_or_inventory_is_enough() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "deploy.yaml", SITE);
    assert_eq!(scan(dir.path()).len(), 2, "playbook plus its tag");

    let dir = TempDir::new().unwrap();
    write(dir.path(), "inventories/prod/hosts", "[db]\ndb1\n");
    let artifacts = scan(dir.path());
    assert_eq!(
        summary(&artifacts),
        vec![(ArtifactKind::InventoryFile, "inventories/prod/hosts".to_string())]
    );
}

// ── Classification and ordering ──

#[test]
fn classifies_sample_project_in_walk_order() {
    let dir = sample_project();
    let artifacts = scan(dir.path());

    assert_eq!(
        summary(&artifacts),
        vec![
            (ArtifactKind::VariableFile, "group_vars/all.yml".to_string()),
            (ArtifactKind::InventoryFile, "hosts".to_string()),
            (ArtifactKind::VariableFile, "roles/web/defaults/main.yml".to_string()),
            (ArtifactKind::Task, "roles/web/tasks/main.yml".to_string()),
            (ArtifactKind::Role, "roles/web".to_string()),
            (ArtifactKind::Playbook, "site.yml".to_string()),
            (ArtifactKind::Tag, "roles/web/tasks/main.yml".to_string()),
            (ArtifactKind::Tag, "roles/web/tasks/main.yml".to_string()),
            (ArtifactKind::Tag, "site.yml".to_string()),
        ]
    );

    let tags: Vec<&str> = artifacts
        .iter()
        .filter(|a| a.kind() == ArtifactKind::Tag)
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(tags, vec!["config", "nginx", "web"]);
}

#[test]
fn role_aggregates_its_task_files() {
    let dir = sample_project();
    write(
        dir.path(),
        "roles/web/tasks/debug/dump.yml",
        "- name: Dump facts\n  debug:\n    var: ansible_facts\n",
    );
    let artifacts = scan(dir.path());
    let role = artifacts
        .iter()
        .find(|a| a.kind() == ArtifactKind::Role)
        .unwrap();

    assert_eq!(role.name, "web");
    let Classified::Role(facts) = &role.class else {
        panic!("expected role facts");
    };
    let files: Vec<String> = facts
        .task_files
        .iter()
        .map(|f| f.relative.to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["debug/dump.yml", "main.yml"]);
    assert_eq!(facts.task_count(), 3);
}

#[test]
fn tag_lists_every_file_using_it() {
    let dir = sample_project();
    write(
        dir.path(),
        "playbooks/nginx.yml",
        "- hosts: web\n  tasks:\n    - name: Reload nginx\n      service:\n        name: nginx\n      tags: [nginx]\n",
    );
    let artifacts = scan(dir.path());
    let nginx = artifacts
        .iter()
        .find(|a| a.kind() == ArtifactKind::Tag && a.name == "nginx")
        .unwrap();
    let Classified::Tag(facts) = &nginx.class else {
        panic!("expected tag facts");
    };
    let used_in: Vec<String> = facts
        .used_in
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    assert_eq!(used_in, vec!["playbooks/nginx.yml", "roles/web/tasks/main.yml"]);
    assert_eq!(nginx.path, Path::new("playbooks/nginx.yml"));
}

// ── Defects ──

#[test]
fn malformed_files_become_defective_artifacts() {
    let dir = sample_project();
    write(dir.path(), "roles/web/tasks/main.yml", "install: nginx\n");
    write(dir.path(), "site.yml", "- hosts: [web\n");

    let artifacts = scan(dir.path());
    let task = artifacts
        .iter()
        .find(|a| a.kind() == ArtifactKind::Task)
        .unwrap();
    assert_eq!(
        task.defect,
        Some(Defect::Malformed("expected a list of tasks".to_string()))
    );

    let playbook = artifacts
        .iter()
        .find(|a| a.kind() == ArtifactKind::Playbook)
        .unwrap();
    assert!(matches!(playbook.defect, Some(Defect::Malformed(_))));

    let role = artifacts
        .iter()
        .find(|a| a.kind() == ArtifactKind::Role)
        .unwrap();
    assert!(!role.is_defective());
    assert_eq!(role.class, Classified::Role(Default::default()));
}

#[test]
fn invalid_utf8_is_malformed() {
    let dir = sample_project();
    fs::write(dir.path().join("group_vars/all.yml"), [0xff, 0xfe, 0x00]).unwrap();
    let artifacts = scan(dir.path());
    let vars = artifacts
        .iter()
        .find(|a| a.path == Path::new("group_vars/all.yml"))
        .unwrap();
    assert_eq!(
        vars.defect,
        Some(Defect::Malformed("file is not valid UTF-8".to_string()))
    );
}

#[cfg(unix)]
mod unix_paths {
    use super::*;
    use ansible_conform_core::Severity;
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    use std::os::unix::fs::symlink;

    fn write_bytes(root: &Path, relative: &[u8], content: &str) {
        let path = root.join(OsStr::from_bytes(relative));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn invalid_utf8_role_directory_is_reported_once() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "site.yml", "- hosts: all\n");
        write_bytes(
            dir.path(),
            b"roles/Web\xff/tasks/main.yml",
            "- name: install nginx\n  apt:\n    name: nginx\n",
        );

        let artifacts = scan(dir.path());
        assert_eq!(
            summary(&artifacts),
            vec![
                (ArtifactKind::Role, "roles/Web\u{FFFD}".to_string()),
                (ArtifactKind::Playbook, "site.yml".to_string()),
            ]
        );
        let role = &artifacts[0];
        assert_eq!(role.name, "Web\u{FFFD}");
        assert_eq!(
            role.defect,
            Some(Defect::Malformed("path is not valid UTF-8".to_string()))
        );
    }

    #[test]
    fn invalid_utf8_paths_render_as_json() {
        let dir = sample_project();
        write_bytes(
            dir.path(),
            b"roles/web/tasks/sub\xff/x.yml",
            "- name: Ping\n  ping:\n",
        );
        let registry = registry();
        let scanner = ProjectScanner::builder().root(dir.path()).build().unwrap();
        let report = Evaluator::new(&registry).run(&scanner).unwrap();

        let failure = report.failures().next().expect("bad path should fail");
        assert_eq!(failure.code, "AC900");
        assert_eq!(failure.location.to_string(), "roles/web/tasks/sub\u{FFFD}");

        let json = report.render(ReportFormat::Json).unwrap();
        assert!(json.contains("roles/web/tasks/sub\u{FFFD}"));
    }

    #[test]
    fn symlinked_role_is_walked() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "site.yml", "- hosts: all\n");
        write(
            dir.path(),
            "shared/Web/tasks/main.yml",
            "- name: Install nginx\n  apt:\n    name: nginx\n",
        );
        fs::create_dir_all(dir.path().join("roles")).unwrap();
        symlink(dir.path().join("shared/Web"), dir.path().join("roles/Web")).unwrap();

        let artifacts = scan(dir.path());
        let found = summary(&artifacts);
        assert!(found.contains(&(ArtifactKind::Role, "roles/Web".to_string())));
        assert!(found.contains(&(ArtifactKind::Task, "roles/Web/tasks/main.yml".to_string())));
        assert!(!found.iter().any(|(_, path)| path.starts_with("shared")));

        let role = artifacts
            .iter()
            .find(|a| a.kind() == ArtifactKind::Role)
            .unwrap();
        let Classified::Role(facts) = &role.class else {
            panic!("role facts expected");
        };
        assert_eq!(facts.task_count(), 1);
    }

    #[test]
    fn dangling_symlink_is_an_unreadable_warning() {
        let dir = sample_project();
        symlink(
            dir.path().join("roles/web/tasks/nope.yml"),
            dir.path().join("roles/web/tasks/extra.yml"),
        )
        .unwrap();
        let registry = registry();
        let scanner = ProjectScanner::builder().root(dir.path()).build().unwrap();
        let report = Evaluator::new(&registry).run(&scanner).unwrap();

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        let unreadable = failures[0];
        assert_eq!(unreadable.code, "AC901");
        assert_eq!(unreadable.severity, Severity::Warning);
        assert_eq!(unreadable.artifact.kind, ArtifactKind::Task);
        assert_eq!(unreadable.location.file, Path::new("roles/web/tasks/extra.yml"));
        assert!(unreadable.message.starts_with("Skipped unreadable path"));

        // The rest of the project is still evaluated.
        assert!(report
            .findings
            .iter()
            .any(|f| f.artifact.path == Path::new("roles/web/tasks/main.yml")));
        assert!(report.findings.iter().any(|f| f.artifact.kind == ArtifactKind::Role));
    }
}

// ── Filtering ──

#[test]
fn exclude_patterns_prune_paths() {
    let dir = sample_project();
    write(dir.path(), "playbooks/legacy/old.yml", SITE);
    let scanner = ProjectScanner::builder()
        .root(dir.path())
        .exclude("**/legacy/**")
        .build()
        .unwrap();
    let artifacts: Vec<Artifact> = scanner.scan().unwrap().collect();
    assert!(artifacts
        .iter()
        .all(|a| !a.path.starts_with("playbooks/legacy")));
}

#[test]
fn gitignore_is_honored_unless_disabled() {
    let dir = sample_project();
    write(dir.path(), ".gitignore", "scratch.yml\n");
    write(dir.path(), "scratch.yml", SITE);

    let paths = |respect: bool| -> Vec<String> {
        ProjectScanner::builder()
            .root(dir.path())
            .respect_gitignore(respect)
            .build()
            .unwrap()
            .scan()
            .unwrap()
            .map(|a| a.path.to_string_lossy().into_owned())
            .collect()
    };

    assert!(!paths(true).contains(&"scratch.yml".to_string()));
    assert!(paths(false).contains(&"scratch.yml".to_string()));
}

// ── Evaluation over a scan ──

/// Fails every task file that names a task in lowercase.
struct LowercaseTask;

impl Rule for LowercaseTask {
    fn name(&self) -> &'static str {
        "no-lowercase-task"
    }

    fn code(&self) -> &'static str {
        "T001"
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Task
    }

    fn check(&self, artifact: &Artifact) -> Verdict {
        let Classified::Task(tasks) = &artifact.class else {
            return Verdict::NotApplicable;
        };
        match tasks
            .iter()
            .find(|t| t.name.as_deref().is_some_and(|n| n.starts_with(char::is_lowercase)))
        {
            Some(task) => Verdict::Fail(Failure::new("lowercase task").at_line(task.line)),
            None => Verdict::Pass,
        }
    }
}

fn registry() -> RuleRegistry {
    RuleRegistry::builder().rule(LowercaseTask).build().unwrap()
}

#[test]
fn rescan_reflects_edits() {
    let dir = sample_project();
    write(
        dir.path(),
        "roles/web/tasks/main.yml",
        "- name: check connectivity\n  ping:\n",
    );
    let registry = registry();
    let scanner = ProjectScanner::builder().root(dir.path()).build().unwrap();

    let report = Evaluator::new(&registry).run(&scanner).unwrap();
    let failure = report.failures().next().expect("lowercase task should fail");
    assert_eq!(failure.location.to_string(), "roles/web/tasks/main.yml:1");

    write(
        dir.path(),
        "roles/web/tasks/main.yml",
        "- name: Check connectivity\n  ping:\n",
    );
    let report = Evaluator::new(&registry).run(&scanner).unwrap();
    assert_eq!(report.failures().count(), 0);
}

#[test]
fn malformed_file_reports_builtin_failure_only() {
    let dir = sample_project();
    write(dir.path(), "roles/web/tasks/main.yml", "- just a string\n");
    let registry = registry();
    let scanner = ProjectScanner::builder().root(dir.path()).build().unwrap();
    let report = Evaluator::new(&registry).run(&scanner).unwrap();

    let failures: Vec<(&str, &str)> = report
        .failures()
        .map(|f| (f.code.as_str(), f.message.as_str()))
        .collect();
    assert_eq!(
        failures,
        vec![("AC900", "Cannot parse task: task #1 is not a mapping")]
    );
}

#[test]
fn repeated_runs_render_identically() {
    let dir = sample_project();
    write(
        dir.path(),
        "roles/db/tasks/main.yml",
        "- name: install postgres\n  apt:\n    name: postgresql\n",
    );
    let registry = registry();
    let scanner = ProjectScanner::builder().root(dir.path()).build().unwrap();

    let first = Evaluator::new(&registry).run(&scanner).unwrap();
    let second = Evaluator::new(&registry).run(&scanner).unwrap();
    for format in [ReportFormat::Text, ReportFormat::Json, ReportFormat::Compact] {
        assert_eq!(
            first.render(format).unwrap(),
            second.render(format).unwrap()
        );
    }

    let parallel = Evaluator::new(&registry)
        .parallel(true)
        .run(&scanner)
        .unwrap();
    assert_eq!(first, parallel);
}
