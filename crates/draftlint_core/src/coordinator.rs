//! Run coordination and the live finding collection.
//!
//! The coordinator owns everything a linting session needs: the compiled
//! rule engine, the suppression store, and one finding collection per open
//! document. Runs are strictly sequential; the editor drives them one at a
//! time against whichever document is active.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use draftlint_store::{SuppressionScope, SuppressionStore};
use tracing::{debug, warn};

use crate::document::Document;
use crate::engine::RuleEngine;
use crate::error::LintError;
use crate::finding::Finding;
use crate::runner::{self, RunContext};

/// Where an ignore request applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreScope {
    /// Every document in the workspace.
    Repository,
    /// The active document only.
    Document,
}

/// Progress notification emitted before each rule of a full run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProgress {
    pub rule_id: String,
    /// Zero-based position of this rule in the run.
    pub index: usize,
    pub total: usize,
}

/// One rule that failed during a full run. The run itself continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub rule_id: String,
    pub message: String,
}

/// Outcome of a full run: the refreshed finding collection plus any
/// per-rule failures.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub findings: Vec<Finding>,
    pub failures: Vec<RuleFailure>,
}

struct DocumentState {
    document: Document,
    findings: Vec<Finding>,
}

/// Sequential run coordinator for one workspace.
pub struct RunCoordinator {
    engine: RuleEngine,
    store: SuppressionStore,
    workspace_root: PathBuf,
    documents: HashMap<String, DocumentState>,
    active: Option<String>,
}

impl RunCoordinator {
    /// Creates a coordinator with the built-in rule set.
    pub fn new(workspace_root: impl Into<PathBuf>) -> Result<Self, LintError> {
        Ok(Self::with_engine(
            workspace_root,
            RuleEngine::with_builtin_rules()?,
        ))
    }

    /// Creates a coordinator around a custom rule set.
    pub fn with_engine(workspace_root: impl Into<PathBuf>, engine: RuleEngine) -> Self {
        Self {
            engine,
            store: SuppressionStore::new(),
            workspace_root: workspace_root.into(),
            documents: HashMap::new(),
            active: None,
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Registers a document snapshot and makes it active. Re-opening a
    /// known URI replaces its snapshot and clears its findings.
    pub fn open_document(&mut self, document: Document) {
        debug!(uri = %document.uri, kind = ?document.kind, "opening document");
        let uri = document.uri.clone();
        self.documents.insert(
            uri.clone(),
            DocumentState {
                document,
                findings: Vec::new(),
            },
        );
        self.active = Some(uri);
    }

    /// Switches the active document to an already-open URI.
    pub fn set_active(&mut self, uri: &str) -> Result<(), LintError> {
        if !self.documents.contains_key(uri) {
            return Err(LintError::DocumentNotOpen(uri.to_string()));
        }
        self.active = Some(uri.to_string());
        Ok(())
    }

    /// Forgets a document and its findings. Returns whether it was open.
    pub fn close_document(&mut self, uri: &str) -> bool {
        if self.active.as_deref() == Some(uri) {
            self.active = None;
        }
        self.documents.remove(uri).is_some()
    }

    pub fn active_document(&self) -> Option<&Document> {
        let uri = self.active.as_deref()?;
        self.documents.get(uri).map(|s| &s.document)
    }

    /// Current findings for an open document, in position order per run.
    pub fn findings(&self, uri: &str) -> Option<&[Finding]> {
        self.documents.get(uri).map(|s| s.findings.as_slice())
    }

    fn active_uri(&self) -> Result<String, LintError> {
        self.active.clone().ok_or(LintError::NoActiveDocument)
    }

    /// Runs one rule against the active document.
    ///
    /// The rule's previous findings are always replaced; `clear_first`
    /// widens the reset to the whole document before the run. Returns the
    /// findings this run produced.
    pub fn run_rule(
        &mut self,
        rule_id: &str,
        clear_first: bool,
    ) -> Result<Vec<Finding>, LintError> {
        let uri = self.active_uri()?;
        let state = self
            .documents
            .get_mut(&uri)
            .ok_or(LintError::DocumentNotOpen(uri))?;
        if !state.document.kind.is_supported() {
            return Err(LintError::UnsupportedDocumentType(
                state.document.relative_path.clone(),
            ));
        }
        let rule = self
            .engine
            .get(rule_id)
            .ok_or_else(|| LintError::UnknownRule(rule_id.to_string()))?;

        let ignores = self.store.effective_ignores(
            &self.workspace_root,
            &state.document.relative_path,
            rule_id,
        )?;

        let ctx = RunContext::new(&state.document);
        let produced = runner::run_rule(rule, &ctx, &ignores)?;
        drop(ctx);

        if clear_first {
            state.findings.clear();
        } else {
            state.findings.retain(|f| f.rule_id != rule_id);
        }
        state.findings.extend(produced.iter().cloned());
        Ok(produced)
    }

    /// Runs every rule against the active document, in engine order.
    ///
    /// The document's findings are rebuilt from scratch. A rule that fails
    /// is recorded in the summary and skipped; the remaining rules still
    /// run. `progress` is called before each rule starts.
    pub fn run_all(
        &mut self,
        mut progress: impl FnMut(&RunProgress),
    ) -> Result<RunSummary, LintError> {
        let uri = self.active_uri()?;
        let state = self
            .documents
            .get_mut(&uri)
            .ok_or(LintError::DocumentNotOpen(uri))?;
        if !state.document.kind.is_supported() {
            return Err(LintError::UnsupportedDocumentType(
                state.document.relative_path.clone(),
            ));
        }

        let ignore_map = self
            .store
            .effective_ignore_map(&self.workspace_root, &state.document.relative_path)?;
        let empty = HashSet::new();

        let ctx = RunContext::new(&state.document);
        let total = self.engine.len();
        let mut summary = RunSummary::default();

        for (index, rule) in self.engine.iter().enumerate() {
            progress(&RunProgress {
                rule_id: rule.id().to_string(),
                index,
                total,
            });
            let ignores = ignore_map.get(rule.id()).unwrap_or(&empty);
            match runner::run_rule(rule, &ctx, ignores) {
                Ok(found) => summary.findings.extend(found),
                Err(e) => {
                    warn!(rule_id = rule.id(), error = %e, "rule failed, continuing run");
                    summary.failures.push(RuleFailure {
                        rule_id: rule.id().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        drop(ctx);

        summary
            .findings
            .sort_by(|a, b| (a.range, &a.rule_id).cmp(&(b.range, &b.rule_id)));
        state.findings = summary.findings.clone();
        Ok(summary)
    }

    /// Suppresses a term for a rule, persists it, and retracts the
    /// matching live findings without a re-run.
    ///
    /// A repository-wide ignore retracts from every open document; a
    /// document ignore only from the active one. Returns how many findings
    /// were retracted.
    pub fn ignore_term(
        &mut self,
        scope: IgnoreScope,
        rule_id: &str,
        term: &str,
    ) -> Result<usize, LintError> {
        let uri = self.active_uri()?;
        if self.engine.get(rule_id).is_none() {
            return Err(LintError::UnknownRule(rule_id.to_string()));
        }
        let state = self
            .documents
            .get(&uri)
            .ok_or_else(|| LintError::DocumentNotOpen(uri.clone()))?;

        let term = term.to_ascii_lowercase();
        let suppression = match scope {
            IgnoreScope::Repository => SuppressionScope::Global,
            IgnoreScope::Document => {
                SuppressionScope::for_document(&state.document.relative_path)
            }
        };
        self.store
            .suppress(&self.workspace_root, &suppression, rule_id, &term)?;

        let mut retracted = 0;
        for (doc_uri, state) in &mut self.documents {
            if scope == IgnoreScope::Document && doc_uri != &uri {
                continue;
            }
            let before = state.findings.len();
            state
                .findings
                .retain(|f| !(f.rule_id == rule_id && f.term == term));
            retracted += before - state.findings.len();
        }
        debug!(rule_id, term, retracted, "suppression applied");
        Ok(retracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use draftlint_rules::{CheckKind, Pattern, Rule, Severity};
    use draftlint_store::MANIFEST_FILE;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_document(uri: &str, relative_path: &str) -> Document {
        Document::new(
            uri,
            relative_path,
            vec![
                "The master node is the API endpoint.".to_string(),
                "A master handles requests.".to_string(),
            ],
        )
    }

    fn coordinator(ws: &TempDir) -> RunCoordinator {
        RunCoordinator::new(ws.path()).unwrap()
    }

    #[test]
    fn test_run_rule_requires_an_active_document() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        let err = c.run_rule("typos", false).unwrap_err();
        assert!(matches!(err, LintError::NoActiveDocument));
    }

    #[test]
    fn test_run_rule_rejects_unsupported_documents() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        c.open_document(Document::new("file:///d.pdf", "d.pdf", vec![]));
        let err = c.run_rule("typos", false).unwrap_err();
        assert!(matches!(err, LintError::UnsupportedDocumentType(_)));
    }

    #[test]
    fn test_run_rule_rejects_unknown_rules() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        c.open_document(sample_document("file:///d.txt", "d.txt"));
        let err = c.run_rule("nope", false).unwrap_err();
        assert!(matches!(err, LintError::UnknownRule(_)));
    }

    #[test]
    fn test_rerun_replaces_instead_of_duplicating() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        c.open_document(sample_document("file:///d.txt", "d.txt"));

        let first = c.run_rule("inclusiveLanguage", false).unwrap();
        assert_eq!(first.len(), 2);
        let second = c.run_rule("inclusiveLanguage", false).unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(c.findings("file:///d.txt").unwrap().len(), 2);
    }

    #[test]
    fn test_findings_from_other_rules_survive_a_scoped_run() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        c.open_document(Document::new(
            "file:///d.txt",
            "d.txt",
            vec!["the the master".to_string()],
        ));

        c.run_rule("repeatedWords", false).unwrap();
        c.run_rule("inclusiveLanguage", false).unwrap();
        assert_eq!(c.findings("file:///d.txt").unwrap().len(), 2);

        // Scoped re-run keeps the other rule's finding.
        c.run_rule("inclusiveLanguage", false).unwrap();
        assert_eq!(c.findings("file:///d.txt").unwrap().len(), 2);

        // clear_first rebuilds from just this rule.
        let cleared = c.run_rule("inclusiveLanguage", true).unwrap();
        assert_eq!(cleared.len(), 1);
        assert_eq!(c.findings("file:///d.txt").unwrap().len(), 1);
    }

    #[test]
    fn test_ignore_term_persists_and_retracts() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        c.open_document(sample_document("file:///d.txt", "d.txt"));
        c.run_rule("inclusiveLanguage", false).unwrap();

        let retracted = c
            .ignore_term(IgnoreScope::Repository, "inclusiveLanguage", "Master")
            .unwrap();
        assert_eq!(retracted, 2);
        assert!(c.findings("file:///d.txt").unwrap().is_empty());

        // The suppression reached disk.
        assert!(ws.path().join(MANIFEST_FILE).exists());

        // And holds on the next run.
        let rerun = c.run_rule("inclusiveLanguage", false).unwrap();
        assert!(rerun.is_empty());
    }

    #[test]
    fn test_document_scoped_ignore_spares_other_documents() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        c.open_document(sample_document("file:///a.txt", "a.txt"));
        c.run_rule("inclusiveLanguage", false).unwrap();
        c.open_document(sample_document("file:///b.txt", "b.txt"));
        c.run_rule("inclusiveLanguage", false).unwrap();

        // b is active; suppress only there.
        c.ignore_term(IgnoreScope::Document, "inclusiveLanguage", "master")
            .unwrap();
        assert!(c.findings("file:///b.txt").unwrap().is_empty());
        assert_eq!(c.findings("file:///a.txt").unwrap().len(), 2);

        // a keeps reporting after a re-run too.
        c.set_active("file:///a.txt").unwrap();
        let rerun = c.run_rule("inclusiveLanguage", false).unwrap();
        assert_eq!(rerun.len(), 2);
    }

    #[test]
    fn test_run_all_reports_progress_and_is_deterministic() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        c.open_document(sample_document("file:///d.txt", "d.txt"));

        let mut seen = Vec::new();
        let first = c
            .run_all(|p| seen.push((p.rule_id.clone(), p.index, p.total)))
            .unwrap();
        assert_eq!(seen.len(), c.engine().len());
        assert_eq!(seen[0].2, c.engine().len());
        assert!(first.failures.is_empty());
        assert!(!first.findings.is_empty());

        let second = c.run_all(|_| {}).unwrap();
        assert_eq!(first.findings, second.findings);
        assert_eq!(c.findings("file:///d.txt").unwrap(), &second.findings[..]);
    }

    #[test]
    fn test_run_all_isolates_rule_failures() {
        let mut pattern = Pattern::new("x");
        pattern.trigger.clear();
        let broken = Rule::new(
            "broken",
            Severity::Warning,
            CheckKind::Terms {
                patterns: vec![pattern],
                message: "{term}".into(),
            },
        );
        let engine =
            RuleEngine::new(vec![broken, draftlint_rules::dictionary::inclusive_language_rule()])
                .unwrap();

        let ws = TempDir::new().unwrap();
        let mut c = RunCoordinator::with_engine(ws.path(), engine);
        c.open_document(sample_document("file:///d.txt", "d.txt"));

        let summary = c.run_all(|_| {}).unwrap();
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].rule_id, "broken");
        // The healthy rule still produced its findings.
        assert_eq!(summary.findings.len(), 2);
    }

    #[test]
    fn test_set_active_requires_open_document() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        let err = c.set_active("file:///ghost.txt").unwrap_err();
        assert!(matches!(err, LintError::DocumentNotOpen(_)));
    }

    #[test]
    fn test_close_document_drops_findings_and_active() {
        let ws = TempDir::new().unwrap();
        let mut c = coordinator(&ws);
        c.open_document(sample_document("file:///d.txt", "d.txt"));
        c.run_rule("inclusiveLanguage", false).unwrap();

        assert!(c.close_document("file:///d.txt"));
        assert!(c.findings("file:///d.txt").is_none());
        assert!(c.active_document().is_none());
        assert!(!c.close_document("file:///d.txt"));
    }
}
