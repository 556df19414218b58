//! # draftlint_core
//!
//! The linting engine: boundary-aware term matching, region exclusion,
//! per-rule execution, run coordination with persisted suppressions, and
//! the batch-validator run ledger.
//!
//! The editor side of the system talks to [`RunCoordinator`]: open a
//! [`Document`], run one rule or all of them, receive [`Finding`]s, and
//! feed "ignore" actions back. Rule content lives in `draftlint_rules`;
//! suppression persistence in `draftlint_store`.

mod coordinator;
mod document;
mod engine;
mod error;
mod exclusion;
mod finding;
mod ledger;
mod matcher;
mod runner;

pub use coordinator::{IgnoreScope, RuleFailure, RunCoordinator, RunProgress, RunSummary};
pub use document::{Document, DocumentKind};
pub use engine::{CompiledRule, RuleEngine};
pub use error::LintError;
pub use exclusion::{ExcludedRegion, compute_excluded_regions, is_excluded};
pub use finding::{Finding, Position, Severity, SourceRange};
pub use ledger::{
    GroupRecord, GroupSpec, LedgerProgress, LedgerReport, Nit, NitCounts, NitKind, RunState,
    TaskFn, TaskRecord, TaskSpec, ValidationContext, ValidationMode, ValidationOptions,
    ValidatorError, run_ledger,
};
pub use matcher::{RawMatch, match_pattern, neutralize_attribute_values};
pub use runner::{RunContext, run_rule};
