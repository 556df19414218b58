//! Engine error types.

use thiserror::Error;

/// Errors that can occur while running checks.
#[derive(Debug, Error)]
pub enum LintError {
    /// No document is active to run against.
    #[error("No active document")]
    NoActiveDocument,

    /// The active document's type is not lintable.
    #[error("Unsupported document type: {0}")]
    UnsupportedDocumentType(String),

    /// The addressed document was never opened (or already closed).
    #[error("Document not open: {0}")]
    DocumentNotOpen(String),

    /// The requested rule does not exist.
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// A single rule failed while executing.
    #[error("Rule '{rule_id}' failed: {message}")]
    RuleExecution { rule_id: String, message: String },

    /// The suppression store could not be read or written.
    #[error(transparent)]
    Store(#[from] draftlint_store::StoreError),
}

impl LintError {
    pub fn rule(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RuleExecution {
            rule_id: rule_id.into(),
            message: message.into(),
        }
    }
}
