//! On-disk manifest format.
//!
//! `manifest.json` lives at the workspace root and is shared with other
//! tooling: publication bookkeeping and similar metadata sit next to the
//! suppression tree. Only the `draftlint` section is interpreted here;
//! every other key is carried through writes untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Manifest file name, relative to the workspace root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Scope key for repository-wide suppressions.
pub(crate) const GLOBAL_SCOPE: &str = "global";

/// Suppressed terms per rule, within one scope.
pub type RuleIgnores = BTreeMap<String, Vec<String>>;

/// The `draftlint` section of the manifest.
///
/// `ignores` is keyed by scope: `"global"` or a document path hash. Term
/// lists are stored as arrays for readability but carry set semantics;
/// writers deduplicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LintSection {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ignores: BTreeMap<String, RuleIgnores>,
}

impl LintSection {
    pub fn is_empty(&self) -> bool {
        self.ignores.is_empty()
    }
}

/// The whole workspace manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "LintSection::is_empty")]
    pub draftlint: LintSection,

    /// Keys owned by other tools, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
