//! Batch-validator run ledger.
//!
//! A validator hands over an ordered list of groups, each an ordered list
//! of tasks. The ledger executes them sequentially, records per-task
//! timing and state, aggregates nit counts, and streams progress as tasks
//! complete. The validator itself is opaque: only the group/task shape and
//! the per-task function signature are consumed here.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Severity class of a validator nit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NitKind {
    Error,
    Warning,
    Comment,
}

/// One issue reported by a validator task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nit {
    pub kind: NitKind,
    pub message: String,
    /// Human-readable location, when the validator provides one.
    pub location: Option<String>,
}

impl Nit {
    pub fn new(kind: NitKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Validator invocation options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    pub mode: ValidationMode,
    pub offline: bool,
    /// Expected publication year, when the caller wants date checks pinned.
    pub year: Option<i32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    #[default]
    Normal,
    Submission,
}

/// Everything a task gets to look at.
pub struct ValidationContext {
    pub raw: String,
    pub filename: String,
    pub options: ValidationOptions,
}

/// A task failure. Aborts the rest of the enclosing group.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ValidatorError(pub String);

pub type TaskFn = Box<dyn Fn(&ValidationContext) -> Result<Vec<Nit>, ValidatorError>>;
type ConditionFn = Box<dyn Fn(&ValidationContext) -> bool>;

/// One unit of validator work.
pub struct TaskSpec {
    pub key: String,
    pub title: String,
    /// Structural tasks that never produce nits of their own.
    pub is_void: bool,
    condition: Option<ConditionFn>,
    run: TaskFn,
}

impl TaskSpec {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        run: impl Fn(&ValidationContext) -> Result<Vec<Nit>, ValidatorError> + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            is_void: false,
            condition: None,
            run: Box::new(run),
        }
    }

    pub fn void(mut self) -> Self {
        self.is_void = true;
        self
    }

    /// Skips the task entirely when the predicate rejects the context.
    pub fn when(mut self, condition: impl Fn(&ValidationContext) -> bool + 'static) -> Self {
        self.condition = Some(Box::new(condition));
        self
    }

    fn applies(&self, ctx: &ValidationContext) -> bool {
        self.condition.as_ref().is_none_or(|c| c(ctx))
    }
}

/// An ordered set of tasks that fail together.
pub struct GroupSpec {
    pub key: String,
    pub title: String,
    pub tasks: Vec<TaskSpec>,
}

impl GroupSpec {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            tasks: Vec::new(),
        }
    }

    pub fn task(mut self, task: TaskSpec) -> Self {
        self.tasks.push(task);
        self
    }
}

/// Execution state of a task or group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// Ledger record for one executed (or skipped) task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub key: String,
    pub title: String,
    pub state: RunState,
    pub nits: Vec<Nit>,
    pub error: Option<String>,
    pub elapsed: Duration,
}

/// Ledger record for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub key: String,
    pub title: String,
    pub state: RunState,
    pub tasks: Vec<TaskRecord>,
    pub elapsed: Duration,
}

/// Nit totals across all completed tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NitCounts {
    pub errors: usize,
    pub warnings: usize,
    pub comments: usize,
}

impl NitCounts {
    fn tally(&mut self, nits: &[Nit]) {
        for nit in nits {
            match nit.kind {
                NitKind::Error => self.errors += 1,
                NitKind::Warning => self.warnings += 1,
                NitKind::Comment => self.comments += 1,
            }
        }
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.comments
    }
}

/// Streaming progress: completed tasks over all applicable tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerProgress {
    pub group_key: String,
    pub task_key: String,
    pub completed: usize,
    pub total: usize,
}

impl LedgerProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

/// Final report: every group record plus aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerReport {
    pub groups: Vec<GroupRecord>,
    pub counts: NitCounts,
    pub elapsed: Duration,
}

impl LedgerReport {
    pub fn failed(&self) -> bool {
        self.groups.iter().any(|g| g.state == RunState::Failed)
    }
}

/// Executes groups in order, fail-fast within each group.
///
/// A failing task marks its group failed and the group's remaining tasks
/// stay pending; completed groups are never rolled back and later groups
/// still run. `progress` fires after every completed or failed task.
pub fn run_ledger(
    groups: Vec<GroupSpec>,
    ctx: &ValidationContext,
    mut progress: impl FnMut(&LedgerProgress),
) -> LedgerReport {
    let total: usize = groups
        .iter()
        .flat_map(|g| g.tasks.iter())
        .filter(|t| t.applies(ctx))
        .count();

    let run_started = Instant::now();
    let mut counts = NitCounts::default();
    let mut completed = 0;
    let mut records = Vec::with_capacity(groups.len());

    for group in groups {
        debug!(group = %group.key, "starting validator group");
        let group_started = Instant::now();
        let mut group_failed = false;
        let mut task_records = Vec::with_capacity(group.tasks.len());

        for task in &group.tasks {
            if !task.applies(ctx) {
                continue;
            }
            if group_failed {
                // Fail-fast: the rest of the group is never attempted.
                task_records.push(TaskRecord {
                    key: task.key.clone(),
                    title: task.title.clone(),
                    state: RunState::Pending,
                    nits: Vec::new(),
                    error: None,
                    elapsed: Duration::ZERO,
                });
                continue;
            }

            let task_started = Instant::now();
            let outcome = (task.run)(ctx);
            let elapsed = task_started.elapsed();

            let record = match outcome {
                Ok(nits) => {
                    if !task.is_void {
                        counts.tally(&nits);
                    }
                    TaskRecord {
                        key: task.key.clone(),
                        title: task.title.clone(),
                        state: RunState::Completed,
                        nits,
                        error: None,
                        elapsed,
                    }
                }
                Err(e) => {
                    warn!(group = %group.key, task = %task.key, error = %e, "validator task failed");
                    group_failed = true;
                    counts.errors += 1;
                    TaskRecord {
                        key: task.key.clone(),
                        title: task.title.clone(),
                        state: RunState::Failed,
                        nits: Vec::new(),
                        error: Some(e.to_string()),
                        elapsed,
                    }
                }
            };
            completed += 1;
            progress(&LedgerProgress {
                group_key: group.key.clone(),
                task_key: task.key.clone(),
                completed,
                total,
            });
            task_records.push(record);
        }

        records.push(GroupRecord {
            key: group.key,
            title: group.title,
            state: if group_failed {
                RunState::Failed
            } else {
                RunState::Completed
            },
            tasks: task_records,
            elapsed: group_started.elapsed(),
        });
    }

    LedgerReport {
        groups: records,
        counts,
        elapsed: run_started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn ctx() -> ValidationContext {
        ValidationContext {
            raw: "draft text".to_string(),
            filename: "draft-example-00.txt".to_string(),
            options: ValidationOptions::default(),
        }
    }

    fn warning_task(key: &str) -> TaskSpec {
        TaskSpec::new(key, key, |_| {
            Ok(vec![Nit::new(NitKind::Warning, "line too long").at("line 12")])
        })
    }

    #[test]
    fn test_all_tasks_pass() {
        let groups = vec![
            GroupSpec::new("format", "Formatting")
                .task(warning_task("line-length"))
                .task(TaskSpec::new("encoding", "Encoding", |_| Ok(vec![]))),
        ];
        let report = run_ledger(groups, &ctx(), |_| {});
        assert!(!report.failed());
        assert_eq!(report.groups[0].state, RunState::Completed);
        assert_eq!(report.counts.warnings, 1);
        assert_eq!(report.counts.errors, 0);
    }

    #[test]
    fn test_failing_task_aborts_its_group_only() {
        let second_ran = Rc::new(Cell::new(false));
        let probe = Rc::clone(&second_ran);

        let groups = vec![
            GroupSpec::new("format", "Formatting")
                .task(warning_task("line-length"))
                .task(TaskSpec::new("encoding", "Encoding", |_| Ok(vec![]))),
            GroupSpec::new("references", "References")
                .task(TaskSpec::new("resolve", "Resolve references", |_| {
                    Err(ValidatorError("registry unavailable".into()))
                }))
                .task(TaskSpec::new("normative", "Normative split", move |_| {
                    probe.set(true);
                    Ok(vec![])
                })),
        ];
        let report = run_ledger(groups, &ctx(), |_| {});

        assert_eq!(report.groups[0].state, RunState::Completed);
        assert_eq!(report.groups[1].state, RunState::Failed);
        assert_eq!(report.groups[1].tasks[0].state, RunState::Failed);
        assert_eq!(report.groups[1].tasks[1].state, RunState::Pending);
        assert!(!second_ran.get(), "aborted task must never execute");
        assert!(report.counts.errors >= 1);
        assert!(report.failed());
    }

    #[test]
    fn test_progress_streams_across_groups() {
        let groups = vec![
            GroupSpec::new("g1", "One").task(warning_task("a")).task(warning_task("b")),
            GroupSpec::new("g2", "Two").task(warning_task("c")),
        ];
        let mut seen = Vec::new();
        run_ledger(groups, &ctx(), |p| seen.push((p.completed, p.total, p.percent())));
        assert_eq!(seen, vec![(1, 3, 33), (2, 3, 66), (3, 3, 100)]);
    }

    #[test]
    fn test_conditional_task_is_excluded_from_total() {
        let groups = vec![
            GroupSpec::new("g", "G")
                .task(warning_task("always"))
                .task(
                    TaskSpec::new("submission-only", "Submission checks", |_| Ok(vec![]))
                        .when(|c| c.options.mode == ValidationMode::Submission),
                ),
        ];
        let mut seen = Vec::new();
        let report = run_ledger(groups, &ctx(), |p| seen.push((p.completed, p.total)));
        assert_eq!(seen, vec![(1, 1)]);
        // The skipped task leaves no record.
        assert_eq!(report.groups[0].tasks.len(), 1);
    }

    #[test]
    fn test_void_task_nits_are_not_counted() {
        let groups = vec![
            GroupSpec::new("g", "G").task(
                TaskSpec::new("setup", "Parse structure", |_| {
                    Ok(vec![Nit::new(NitKind::Comment, "sections parsed")])
                })
                .void(),
            ),
        ];
        let report = run_ledger(groups, &ctx(), |_| {});
        assert_eq!(report.counts.total(), 0);
        assert_eq!(report.groups[0].tasks[0].nits.len(), 1);
    }

    #[test]
    fn test_task_timing_is_recorded() {
        let groups = vec![GroupSpec::new("g", "G").task(warning_task("a"))];
        let report = run_ledger(groups, &ctx(), |_| {});
        assert!(report.groups[0].elapsed >= report.groups[0].tasks[0].elapsed);
        assert!(report.elapsed >= report.groups[0].elapsed);
    }
}
