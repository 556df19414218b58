//! Finding types.

use serde::{Deserialize, Serialize};

pub use draftlint_rules::Severity;

/// A line/column position. Columns are byte offsets within the line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A half-open source span.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SourceRange {
    pub start: Position,
    pub end: Position,
}

impl SourceRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A span confined to one line.
    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start: Position::new(line, start_column),
            end: Position::new(line, end_column),
        }
    }
}

/// One reported rule violation.
///
/// `term` is the normalized (lowercase) match key used for suppression,
/// not the literal matched text: suppressing `native` also suppresses
/// `Native`. Two findings are duplicates iff `(rule_id, term, range)` are
/// equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub term: String,
    pub range: SourceRange,
    pub message: String,
    pub severity: Severity,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        term: impl Into<String>,
        range: SourceRange,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            term: term.into(),
            range,
            message: message.into(),
            severity: Severity::Warning,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Duplicate test per the identity contract.
    pub fn is_duplicate_of(&self, other: &Finding) -> bool {
        self.rule_id == other.rule_id && self.term == other.term && self.range == other.range
    }
}
