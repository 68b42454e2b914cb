//! The rule registry: an immutable, ordered set of rules.

use crate::artifact::ArtifactKind;
use crate::builtin::{MalformedArtifact, UnreadablePath};
use crate::config::Config;
use crate::rule::{Rule, RuleBox};
use crate::types::Severity;

use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Errors raised while building or querying the registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// No rule matches the given id or code.
    #[error("Unknown rule: {0}")]
    NotFound(String),

    /// Two rules were registered under the same id.
    #[error("Rule registered twice: {0}")]
    Duplicate(String),
}

/// A rule together with the severity it reports at.
pub struct RegisteredRule {
    rule: RuleBox,
    severity: Severity,
    builtin: bool,
}

impl RegisteredRule {
    /// Returns the underlying rule.
    #[must_use]
    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }

    /// Returns the rule id.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.rule.name()
    }

    /// Returns the rule code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.rule.code()
    }

    /// Returns the effective severity (configured override or rule default).
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns true for the always-on defect rules.
    #[must_use]
    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    fn matches(&self, id: &str) -> bool {
        self.name() == id || self.code().eq_ignore_ascii_case(id)
    }
}

impl std::fmt::Debug for RegisteredRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredRule")
            .field("name", &self.name())
            .field("code", &self.code())
            .field("severity", &self.severity)
            .field("builtin", &self.builtin)
            .finish()
    }
}

/// Builder for a [`RuleRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
    only: Option<Vec<String>>,
}

impl RegistryBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Applies enable flags and severity overrides from configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Restricts the registry to the given rule ids or codes.
    ///
    /// Built-in defect rules stay registered regardless.
    #[must_use]
    pub fn only<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.only = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the registry.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] if two rules share an id, or
    /// [`RegistryError::NotFound`] if `only` names an unknown rule.
    pub fn build(self) -> Result<RuleRegistry, RegistryError> {
        let config = self.config.unwrap_or_default();

        let mut registered: Vec<RegisteredRule> = Vec::new();
        let builtins: [RuleBox; 2] = [Box::new(MalformedArtifact), Box::new(UnreadablePath)];
        for rule in builtins {
            registered.push(RegisteredRule {
                severity: rule.default_severity(),
                rule,
                builtin: true,
            });
        }

        let mut seen: HashSet<&'static str> = registered.iter().map(|r| r.name()).collect();
        for rule in self.rules {
            if !seen.insert(rule.name()) {
                return Err(RegistryError::Duplicate(rule.name().to_string()));
            }
            let severity = config
                .rule_severity(rule.name())
                .unwrap_or_else(|| rule.default_severity());
            registered.push(RegisteredRule {
                rule,
                severity,
                builtin: false,
            });
        }

        if let Some(only) = &self.only {
            for id in only {
                if !registered.iter().any(|r| !r.builtin && r.matches(id)) {
                    return Err(RegistryError::NotFound(id.clone()));
                }
            }
            registered.retain(|r| r.builtin || only.iter().any(|id| r.matches(id)));
        }

        registered.retain(|r| {
            let enabled = r.builtin || config.is_rule_enabled(r.name());
            if !enabled {
                debug!("Skipping disabled rule: {}", r.name());
            }
            enabled
        });

        Ok(RuleRegistry { rules: registered })
    }
}

/// Ordered, read-only set of rules.
///
/// Use [`RuleRegistry::builder()`] to construct an instance. The registry is
/// passed explicitly to the evaluator; there is no global instance.
#[derive(Debug)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
}

impl RuleRegistry {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns every rule in listing order.
    #[must_use]
    pub fn list_rules(&self) -> &[RegisteredRule] {
        &self.rules
    }

    /// Looks up a rule by id or code.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no rule matches.
    pub fn rule_for(&self, id: &str) -> Result<&RegisteredRule, RegistryError> {
        self.rules
            .iter()
            .find(|r| r.matches(id))
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Returns the rules that apply to an artifact kind, in listing order.
    pub fn applicable(&self, kind: ArtifactKind) -> impl Iterator<Item = &RegisteredRule> {
        self.rules
            .iter()
            .filter(move |r| r.rule().target().applies_to(kind))
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
