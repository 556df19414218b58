//! Rule compilation.
//!
//! Rule data is compiled into matcher form once, when the engine is
//! constructed. Runs only ever see compiled rules, which keeps dictionary
//! content and matching machinery apart.

use draftlint_rules::{CheckKind, Rule, Severity};
use regex::Regex;

use crate::error::LintError;

/// Pre-built matchers for one rule.
#[derive(Debug)]
pub(crate) enum CompiledCheck {
    Terms,
    RepeatedWords,
    NonAscii(Regex),
    Articles,
    Hyphenation(Regex),
    Abbreviations,
}

/// A rule plus everything derived from it at startup.
#[derive(Debug)]
pub struct CompiledRule {
    pub(crate) rule: Rule,
    pub(crate) check: CompiledCheck,
}

impl CompiledRule {
    pub fn id(&self) -> &str {
        &self.rule.id
    }

    pub fn severity(&self) -> Severity {
        self.rule.severity
    }

    pub fn region_sensitive(&self) -> bool {
        self.rule.region_sensitive
    }

    fn compile(rule: Rule) -> Result<Self, LintError> {
        let check = match &rule.check {
            CheckKind::Terms { .. } => CompiledCheck::Terms,
            CheckKind::RepeatedWords => CompiledCheck::RepeatedWords,
            CheckKind::NonAscii => CompiledCheck::NonAscii(compile_regex(&rule.id, r"[^\x00-\x7F]+")?),
            CheckKind::Articles { .. } => CompiledCheck::Articles,
            CheckKind::Hyphenation => {
                CompiledCheck::Hyphenation(compile_regex(&rule.id, r"[A-Za-z]+(?:-[A-Za-z]+)+")?)
            }
            CheckKind::Abbreviations { .. } => CompiledCheck::Abbreviations,
        };
        Ok(Self { rule, check })
    }
}

fn compile_regex(rule_id: &str, pattern: &str) -> Result<Regex, LintError> {
    Regex::new(pattern).map_err(|e| LintError::rule(rule_id, e.to_string()))
}

/// The compiled rule set.
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
}

impl RuleEngine {
    /// Compiles a rule set. Rules keep their given order.
    pub fn new(rules: Vec<Rule>) -> Result<Self, LintError> {
        let rules = rules
            .into_iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Compiles the built-in rule set.
    pub fn with_builtin_rules() -> Result<Self, LintError> {
        Self::new(draftlint_rules::builtin_rules())
    }

    pub fn get(&self, rule_id: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.id() == rule_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }
}
