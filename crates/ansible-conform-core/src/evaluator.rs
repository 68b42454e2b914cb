//! Applies registered rules to scanned artifacts.

use crate::artifact::Artifact;
use crate::registry::{RegisteredRule, RuleRegistry};
use crate::report::Report;
use crate::rule::Verdict;
use crate::scanner::{ProjectScanner, ScanError};
use crate::types::{Finding, Location, Outcome};

use rayon::prelude::*;
use tracing::{debug, info};

/// Evaluates artifacts against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'r> {
    registry: &'r RuleRegistry,
    parallel: bool,
}

impl<'r> Evaluator<'r> {
    /// Creates a sequential evaluator.
    #[must_use]
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            parallel: false,
        }
    }

    /// Sets whether artifacts are evaluated on the rayon thread pool.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Evaluates one artifact.
    ///
    /// Rules run in registry order and yield at most one finding each.
    /// Defective artifacts are only checked by the built-in defect rules.
    #[must_use]
    pub fn evaluate(&self, artifact: &Artifact) -> Vec<Finding> {
        let defective = artifact.is_defective();
        self.registry
            .applicable(artifact.kind())
            .filter(|registered| !defective || registered.is_builtin())
            .filter_map(|registered| finding(registered, artifact))
            .collect()
    }

    /// Evaluates every artifact and collects a sorted report.
    #[must_use]
    pub fn evaluate_all(&self, artifacts: Vec<Artifact>) -> Report {
        let scanned = artifacts.len();
        let findings: Vec<Finding> = if self.parallel {
            artifacts
                .par_iter()
                .flat_map_iter(|artifact| self.evaluate(artifact))
                .collect()
        } else {
            artifacts
                .iter()
                .flat_map(|artifact| self.evaluate(artifact))
                .collect()
        };
        Report::new(findings, scanned)
    }

    /// Scans a project and evaluates everything found.
    ///
    /// # Errors
    ///
    /// Returns the scanner's error if the project cannot be scanned.
    pub fn run(&self, scanner: &ProjectScanner) -> Result<Report, ScanError> {
        let report = if self.parallel {
            let artifacts: Vec<Artifact> = scanner.scan()?.collect();
            info!("Evaluating {} artifacts in parallel", artifacts.len());
            self.evaluate_all(artifacts)
        } else {
            let mut scanned = 0;
            let mut findings = Vec::new();
            for artifact in scanner.scan()? {
                scanned += 1;
                findings.extend(self.evaluate(&artifact));
            }
            Report::new(findings, scanned)
        };

        let (errors, warnings) = report.count_by_severity();
        info!(
            "Evaluation complete: {errors} error(s), {warnings} warning(s) across {} artifacts",
            report.artifacts_scanned
        );
        Ok(report)
    }
}

fn finding(registered: &RegisteredRule, artifact: &Artifact) -> Option<Finding> {
    let rule = registered.rule();
    let (outcome, message, line, suggestion) = match rule.check(artifact) {
        Verdict::Pass => (Outcome::Pass, rule.description().to_string(), 0, None),
        Verdict::Fail(failure) => (
            Outcome::Fail,
            failure.message,
            failure.line,
            failure.suggestion,
        ),
        Verdict::NotApplicable => {
            debug!(
                "{} not applicable to {}",
                registered.name(),
                artifact.path.display()
            );
            return None;
        }
    };

    Some(Finding {
        rule: registered.name().to_string(),
        code: registered.code().to_string(),
        severity: registered.severity(),
        outcome,
        artifact: artifact.reference(),
        location: Location::new(artifact.path.clone(), line),
        message,
        suggestion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactKind, Classified};
    use crate::rule::{Failure, Rule, RuleTarget};
    use crate::types::Severity;

    struct ShortName;

    impl Rule for ShortName {
        fn name(&self) -> &'static str {
            "short-role-name"
        }
        fn code(&self) -> &'static str {
            "T100"
        }
        fn description(&self) -> &'static str {
            "Role names are short"
        }
        fn target(&self) -> RuleTarget {
            RuleTarget::Role
        }
        fn check(&self, artifact: &Artifact) -> Verdict {
            if artifact.name.len() > 5 {
                Verdict::Fail(Failure::new("too long").with_suggestion("shorten it"))
            } else {
                Verdict::Pass
            }
        }
    }

    fn registry() -> RuleRegistry {
        RuleRegistry::builder().rule(ShortName).build().unwrap()
    }

    fn role(name: &str) -> Artifact {
        Artifact::new(
            format!("roles/{name}"),
            name,
            Classified::empty(ArtifactKind::Role),
        )
    }

    #[test]
    fn healthy_artifact_gets_one_finding_per_rule() {
        let registry = registry();
        let findings = Evaluator::new(&registry).evaluate(&role("web"));
        let rules: Vec<&str> = findings.iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(
            rules,
            vec!["malformed-artifact", "unreadable-path", "short-role-name"]
        );
        assert!(findings.iter().all(|f| f.outcome == Outcome::Pass));
        assert_eq!(findings[2].message, "Role names are short");
    }

    #[test]
    fn failure_carries_suggestion_and_severity() {
        let registry = registry();
        let findings = Evaluator::new(&registry).evaluate(&role("database"));
        let failure = findings.iter().find(|f| f.is_failure()).unwrap();
        assert_eq!(failure.code, "T100");
        assert_eq!(failure.severity, Severity::Error);
        assert_eq!(failure.suggestion.as_ref().unwrap().message, "shorten it");
        assert_eq!(failure.location, Location::whole("roles/database"));
    }

    #[test]
    fn defective_artifact_only_sees_builtin_rules() {
        let registry = registry();
        let artifact = Artifact::malformed(ArtifactKind::Role, "roles/x", "x", "bad");
        let findings = Evaluator::new(&registry).evaluate(&artifact);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, "malformed-artifact");
        assert!(findings[0].is_failure());
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let registry = registry();
        let artifacts: Vec<Artifact> = ["zeta", "alpha", "database", "web", "monitoring"]
            .into_iter()
            .map(role)
            .collect();
        let sequential = Evaluator::new(&registry).evaluate_all(artifacts.clone());
        let parallel = Evaluator::new(&registry)
            .parallel(true)
            .evaluate_all(artifacts);
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.artifacts_scanned, 5);
    }
}
