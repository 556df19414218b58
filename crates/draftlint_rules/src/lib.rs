//! # draftlint_rules
//!
//! Rule definitions and term dictionaries for draftlint.
//!
//! A [`Rule`] is pure data: an identifier, a severity, and a [`CheckKind`]
//! describing what the engine should look for. The tables in [`dictionary`]
//! build the full built-in rule set once at startup; nothing here executes
//! a check.

pub mod dictionary;

use serde::{Deserialize, Serialize};

pub use dictionary::builtin_rules;

/// Severity level for findings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Warning - should be reviewed.
    #[default]
    Warning,
    /// Error - must be fixed.
    Error,
}

/// A single trigger term with its matching options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    /// The literal term to look for.
    pub trigger: String,
    /// Suggested replacement, if the rule offers one.
    pub suggestion: Option<String>,
    /// Match the trigger exactly as written instead of case-insensitively.
    pub case_sensitive: bool,
    /// Match against the current line combined with the start of the next
    /// line, so phrases broken across a line wrap are still found.
    pub spans_lines: bool,
}

impl Pattern {
    /// Creates a case-insensitive, single-line pattern.
    ///
    /// Triggers containing whitespace automatically match across line
    /// wraps.
    pub fn new(trigger: impl Into<String>) -> Self {
        let trigger = trigger.into();
        let spans_lines = trigger.contains(' ');
        Self {
            trigger,
            suggestion: None,
            case_sensitive: false,
            spans_lines,
        }
    }

    /// Sets the suggested replacement.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Makes the pattern case-sensitive.
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Forces matching against the combined-line window even for a
    /// single-word trigger (e.g. to catch hyphen-wrapped words).
    pub fn spanning(mut self) -> Self {
        self.spans_lines = true;
        self
    }
}

/// An abbreviation and its expected full expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbbreviationPair {
    pub short: String,
    pub expansion: String,
}

impl AbbreviationPair {
    pub fn new(short: impl Into<String>, expansion: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            expansion: expansion.into(),
        }
    }
}

/// Exception tables for the indefinite-article check.
///
/// All entries are lowercase prefixes compared against the word following
/// (or preceding) the article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleExceptions {
    /// Words before "a" that suppress the vowel check (e.g. "Appendix A a…").
    pub a_prev_ok: Vec<String>,
    /// Vowel-initial words that legitimately take "a" ("a one-way", "a user").
    pub a_vowel_ok: Vec<String>,
    /// R-acronyms pronounced as words, fine after "a" ("a RADIUS server").
    pub a_r_acronym_ok: Vec<String>,
    /// Consonant-initial words that legitimately take "an" ("an hour").
    pub an_consonant_ok: Vec<String>,
    /// Acronyms spoken with a consonant sound that must take "a" ("a NAT").
    pub an_bad_acronyms: Vec<String>,
}

/// What a rule checks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckKind {
    /// Dictionary-driven term matching. `message` is a template with
    /// `{term}` and `{suggestion}` placeholders.
    Terms {
        patterns: Vec<Pattern>,
        message: String,
    },
    /// Accidental word doubling ("the the").
    RepeatedWords,
    /// Runs of non-ASCII characters.
    NonAscii,
    /// Indefinite-article misuse ("a apple", "an host").
    Articles { exceptions: ArticleExceptions },
    /// Inconsistent hyphenation (both "sub-series" and "subseries" used).
    Hyphenation,
    /// Abbreviation used before its full expansion is introduced.
    Abbreviations { pairs: Vec<AbbreviationPair> },
}

/// A named, independent check producing zero or more findings.
///
/// Rules are constructed once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Stable identifier, also the suppression namespace.
    pub id: String,
    pub severity: Severity,
    /// Whether matches inside excluded regions (code blocks, artwork) are
    /// discarded.
    pub region_sensitive: bool,
    pub check: CheckKind,
}

impl Rule {
    pub fn new(id: impl Into<String>, severity: Severity, check: CheckKind) -> Self {
        Self {
            id: id.into(),
            severity,
            region_sensitive: true,
            check,
        }
    }

    /// Keeps matches inside excluded regions.
    pub fn ignore_regions(mut self) -> Self {
        self.region_sensitive = false;
        self
    }
}
