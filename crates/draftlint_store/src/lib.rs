//! # draftlint_store
//!
//! Durable suppression storage, backed by a per-workspace `manifest.json`.
//!
//! A suppression maps `(scope, rule id)` to a set of terms the user no
//! longer wants reported. Scope is either the whole repository or a single
//! document, addressed by a stable hash of its workspace-relative path.
//! Manifests are loaded lazily, cached per workspace path, and written back
//! to disk on every mutation.

mod manifest;

pub use manifest::{LintSection, MANIFEST_FILE, Manifest};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use manifest::GLOBAL_SCOPE;

/// Errors raised by the suppression store.
///
/// A missing manifest file is not an error: the store treats it as an
/// empty manifest. Everything else is surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot read manifest at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("manifest at {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot write manifest at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot serialize manifest for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The breadth of a suppression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SuppressionScope {
    /// Applies to every document in the workspace.
    Global,
    /// Applies to one document, identified by its path hash.
    Document(String),
}

impl SuppressionScope {
    /// Scope for a single document, from its workspace-relative path.
    pub fn for_document(relative_path: &str) -> Self {
        Self::Document(hash_document_path(relative_path))
    }

    fn key(&self) -> &str {
        match self {
            Self::Global => GLOBAL_SCOPE,
            Self::Document(hash) => hash,
        }
    }
}

/// Stable one-way hash of a workspace-relative document path.
///
/// The same path always yields the same hash across runs and restarts, so
/// document-scoped suppressions survive process restarts.
pub fn hash_document_path(relative_path: &str) -> String {
    blake3::hash(relative_path.as_bytes()).to_hex().to_string()
}

/// Effective ignore lists for one document: rule id -> suppressed terms.
pub type IgnoreMap = HashMap<String, HashSet<String>>;

/// Durable, cached suppression storage.
///
/// The manifest cache is process-wide and keyed by workspace path. All
/// reads and writes for a workspace go through one lock, so concurrent
/// suppression edits serialize instead of losing updates.
#[derive(Default)]
pub struct SuppressionStore {
    manifests: Mutex<HashMap<PathBuf, Manifest>>,
}

impl SuppressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` against the cached manifest for `workspace`, loading it
    /// from disk first if needed.
    fn with_manifest<R>(
        &self,
        workspace: &Path,
        f: impl FnOnce(&mut Manifest) -> R,
    ) -> Result<R, StoreError> {
        let mut cache = self.manifests.lock();
        let manifest = match cache.entry(workspace.to_path_buf()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(v) => v.insert(load_from_disk(workspace)?),
        };
        Ok(f(manifest))
    }

    /// Effective ignore set for `(document, rule)`: the union of the
    /// global list and the document-scoped list.
    pub fn effective_ignores(
        &self,
        workspace: &Path,
        document_path: &str,
        rule_id: &str,
    ) -> Result<HashSet<String>, StoreError> {
        let doc_scope = hash_document_path(document_path);
        self.with_manifest(workspace, |manifest| {
            let mut terms = HashSet::new();
            for scope in [GLOBAL_SCOPE, doc_scope.as_str()] {
                if let Some(rules) = manifest.draftlint.ignores.get(scope)
                    && let Some(list) = rules.get(rule_id)
                {
                    terms.extend(list.iter().cloned());
                }
            }
            terms
        })
    }

    /// Effective ignore lists for every rule of one document.
    pub fn effective_ignore_map(
        &self,
        workspace: &Path,
        document_path: &str,
    ) -> Result<IgnoreMap, StoreError> {
        let doc_scope = hash_document_path(document_path);
        self.with_manifest(workspace, |manifest| {
            let mut map: IgnoreMap = HashMap::new();
            for scope in [GLOBAL_SCOPE, doc_scope.as_str()] {
                if let Some(rules) = manifest.draftlint.ignores.get(scope) {
                    for (rule_id, terms) in rules {
                        map.entry(rule_id.clone())
                            .or_default()
                            .extend(terms.iter().cloned());
                    }
                }
            }
            map
        })
    }

    /// Adds `term` to the addressed scope's list for `rule_id` and
    /// persists the manifest before returning.
    ///
    /// Suppressing an already-suppressed term is a no-op.
    pub fn suppress(
        &self,
        workspace: &Path,
        scope: &SuppressionScope,
        rule_id: &str,
        term: &str,
    ) -> Result<(), StoreError> {
        let mut cache = self.manifests.lock();
        let manifest = match cache.entry(workspace.to_path_buf()) {
            std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
            std::collections::hash_map::Entry::Vacant(v) => v.insert(load_from_disk(workspace)?),
        };

        let terms = manifest
            .draftlint
            .ignores
            .entry(scope.key().to_string())
            .or_default()
            .entry(rule_id.to_string())
            .or_default();

        if terms.iter().any(|t| t == term) {
            return Ok(());
        }
        terms.push(term.to_string());

        debug!(
            scope = scope.key(),
            rule_id, term, "persisting suppression"
        );
        persist(workspace, manifest)
    }

    /// Drops the cached manifest for a workspace. The next access reloads
    /// it from disk.
    pub fn evict(&self, workspace: &Path) -> bool {
        self.manifests.lock().remove(workspace).is_some()
    }
}

fn manifest_path(workspace: &Path) -> PathBuf {
    workspace.join(MANIFEST_FILE)
}

fn load_from_disk(workspace: &Path) -> Result<Manifest, StoreError> {
    let path = manifest_path(workspace);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no manifest on disk, starting empty");
            return Ok(Manifest::default());
        }
        Err(source) => return Err(StoreError::Read { path, source }),
    };
    serde_json::from_str(&raw).map_err(|source| StoreError::Parse { path, source })
}

fn persist(workspace: &Path, manifest: &Manifest) -> Result<(), StoreError> {
    let path = manifest_path(workspace);
    let raw = serde_json::to_vec_pretty(manifest).map_err(|source| StoreError::Serialize {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, raw).map_err(|source| StoreError::Write { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    #[test]
    fn test_missing_manifest_is_empty_store() {
        let ws = workspace();
        let store = SuppressionStore::new();
        let ignores = store
            .effective_ignores(ws.path(), "draft-a.xml", "typos")
            .unwrap();
        assert!(ignores.is_empty());
    }

    #[test]
    fn test_corrupt_manifest_is_an_error() {
        let ws = workspace();
        std::fs::write(ws.path().join(MANIFEST_FILE), "{not json").unwrap();
        let store = SuppressionStore::new();
        let err = store
            .effective_ignores(ws.path(), "draft-a.xml", "typos")
            .unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn test_suppress_is_idempotent() {
        let ws = workspace();
        let store = SuppressionStore::new();
        let scope = SuppressionScope::Global;
        store
            .suppress(ws.path(), &scope, "inclusiveLanguage", "master")
            .unwrap();
        store
            .suppress(ws.path(), &scope, "inclusiveLanguage", "master")
            .unwrap();

        let ignores = store
            .effective_ignores(ws.path(), "draft-a.xml", "inclusiveLanguage")
            .unwrap();
        assert_eq!(ignores.len(), 1);
        assert!(ignores.contains("master"));
    }

    #[test]
    fn test_document_scope_does_not_leak_across_documents() {
        let ws = workspace();
        let store = SuppressionStore::new();
        let scope = SuppressionScope::for_document("draft-a.xml");
        store.suppress(ws.path(), &scope, "typos", "steam").unwrap();

        let a = store
            .effective_ignores(ws.path(), "draft-a.xml", "typos")
            .unwrap();
        let b = store
            .effective_ignores(ws.path(), "draft-b.xml", "typos")
            .unwrap();
        assert!(a.contains("steam"));
        assert!(b.is_empty());
    }

    #[test]
    fn test_global_scope_applies_to_every_document() {
        let ws = workspace();
        let store = SuppressionStore::new();
        store
            .suppress(ws.path(), &SuppressionScope::Global, "typos", "steam")
            .unwrap();

        for doc in ["draft-a.xml", "draft-b.md"] {
            let ignores = store.effective_ignores(ws.path(), doc, "typos").unwrap();
            assert!(ignores.contains("steam"), "missing for {doc}");
        }
    }

    #[test]
    fn test_effective_set_is_union_of_scopes() {
        let ws = workspace();
        let store = SuppressionStore::new();
        store
            .suppress(ws.path(), &SuppressionScope::Global, "typos", "steam")
            .unwrap();
        store
            .suppress(
                ws.path(),
                &SuppressionScope::for_document("draft-a.xml"),
                "typos",
                "sever",
            )
            .unwrap();

        let ignores = store
            .effective_ignores(ws.path(), "draft-a.xml", "typos")
            .unwrap();
        assert_eq!(ignores.len(), 2);
        assert!(ignores.contains("steam"));
        assert!(ignores.contains("sever"));
    }

    #[test]
    fn test_round_trip_through_disk() {
        let ws = workspace();
        {
            let store = SuppressionStore::new();
            store
                .suppress(ws.path(), &SuppressionScope::Global, "typos", "steam")
                .unwrap();
            store
                .suppress(
                    ws.path(),
                    &SuppressionScope::for_document("draft-a.xml"),
                    "hyphenation",
                    "sub-tree",
                )
                .unwrap();
        }

        // Fresh store, fresh cache: everything must come back from disk.
        let store = SuppressionStore::new();
        let typos = store
            .effective_ignores(ws.path(), "draft-a.xml", "typos")
            .unwrap();
        let hyphenation = store
            .effective_ignores(ws.path(), "draft-a.xml", "hyphenation")
            .unwrap();
        assert!(typos.contains("steam"));
        assert!(hyphenation.contains("sub-tree"));
    }

    #[test]
    fn test_unrelated_manifest_keys_survive_suppression() {
        let ws = workspace();
        std::fs::write(
            ws.path().join(MANIFEST_FILE),
            r#"{"publishTarget": "datatracker", "revision": 7}"#,
        )
        .unwrap();

        let store = SuppressionStore::new();
        store
            .suppress(ws.path(), &SuppressionScope::Global, "typos", "steam")
            .unwrap();

        let raw = std::fs::read_to_string(ws.path().join(MANIFEST_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["publishTarget"], "datatracker");
        assert_eq!(value["revision"], 7);
        assert_eq!(value["draftlint"]["ignores"]["global"]["typos"][0], "steam");
    }

    #[test]
    fn test_path_hash_is_stable() {
        let a = hash_document_path("drafts/draft-a.xml");
        let b = hash_document_path("drafts/draft-a.xml");
        let c = hash_document_path("drafts/draft-b.xml");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_evict_reloads_from_disk() {
        let ws = workspace();
        let store = SuppressionStore::new();
        store
            .suppress(ws.path(), &SuppressionScope::Global, "typos", "steam")
            .unwrap();

        // Mutate the file behind the cache's back.
        std::fs::write(
            ws.path().join(MANIFEST_FILE),
            r#"{"draftlint": {"ignores": {"global": {"typos": ["sever"]}}}}"#,
        )
        .unwrap();

        let before = store
            .effective_ignores(ws.path(), "draft-a.xml", "typos")
            .unwrap();
        assert!(before.contains("steam"));

        assert!(store.evict(ws.path()));
        let after = store
            .effective_ignores(ws.path(), "draft-a.xml", "typos")
            .unwrap();
        assert!(after.contains("sever"));
        assert!(!after.contains("steam"));
    }
}
