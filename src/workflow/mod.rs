//! Revision comparison workflow.
//!
//! Brackets two measurement passes around a revision switch:
//!
//! 1. record the current revision
//! 2. measure the working tree (head)
//! 3. stash uncommitted changes, if any
//! 4. check out the baseline revision
//! 5. measure again (baseline)
//! 6. restore: check out the original revision, pop the stash
//!
//! Step 6 runs whenever step 2 has begun, whatever happened in between.
//! Both restoration sub-steps are attempted independently and their
//! outcomes reported together; a panic inside a measurement pass is
//! covered by the guard's `Drop`.

use crate::error::{BenchDiffError, RestoreReport, Result, StepOutcome};
use crate::model::ResultSet;
use crate::util::cancel::CancelToken;
use crate::vcs::{Git, StashEntry, Vcs};
use std::path::Path;
use tracing::{error, info, warn};

/// Which measurement pass is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Head,
    Baseline,
}

impl Pass {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Baseline => "baseline",
        }
    }
}

/// Workflow phase, in the order phases are reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    NotStarted,
    MeasuredHead,
    Stashed,
    CheckedOutBaseline,
    MeasuredBaseline,
    Restored,
}

/// Process-local state of one `execute` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    pub original_revision: String,
    pub had_changes: bool,
    pub stash: Option<StashEntry>,
    /// Set before the checkout is attempted; a failed checkout may still
    /// have touched the tree.
    pub checkout_attempted: bool,
    pub phase: Phase,
}

/// Head and baseline results of a completed workflow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comparison {
    pub head: ResultSet,
    pub baseline: ResultSet,
    pub original_revision: String,
}

/// Runs the comparison workflow against a [`Vcs`].
pub struct RevisionWorkflow<V: Vcs> {
    vcs: V,
    cancel: CancelToken,
    stash_marker: String,
}

impl<V: Vcs> RevisionWorkflow<V> {
    #[must_use]
    pub fn new(vcs: V) -> Self {
        Self {
            vcs,
            cancel: CancelToken::new(),
            stash_marker: default_stash_marker(),
        }
    }

    /// Abort between steps once `cancel` is raised.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_stash_marker(mut self, marker: impl Into<String>) -> Self {
        self.stash_marker = marker.into();
        self
    }

    /// Measure head, switch to `baseline`, measure again, restore.
    ///
    /// # Errors
    ///
    /// - `RevisionResolution` if the current revision cannot be determined
    /// - any error from `measure`, `Stash` or `Checkout`, after restoration
    /// - `Restore` if every step succeeded but restoration did not
    /// - `WorkflowAborted` if a step failed and restoration failed too
    pub fn execute<F>(&self, baseline: &str, mut measure: F) -> Result<Comparison>
    where
        F: FnMut(Pass) -> Result<ResultSet>,
    {
        let original_revision = self.resolve_original_revision()?;
        info!(original = %original_revision, baseline, "Starting comparison");

        let mut guard = RestoreGuard::new(
            &self.vcs,
            WorkflowState {
                original_revision: original_revision.clone(),
                ..WorkflowState::default()
            },
        );

        let outcome = self.run_passes(&mut guard.state, baseline, &mut measure);
        let (state, report) = guard.restore();
        info!(phase = ?state.phase, "Workflow finished");

        match outcome {
            Ok((head, baseline)) if report.is_clean() => Ok(Comparison {
                head,
                baseline,
                original_revision,
            }),
            Ok(_) => Err(BenchDiffError::Restore { report }),
            Err(e) => Err(e.with_restore(report)),
        }
    }

    fn resolve_original_revision(&self) -> Result<String> {
        if let Some(branch) = self.vcs.current_branch()? {
            return Ok(branch);
        }
        let commit = self.vcs.head_commit()?;
        warn!(
            commit = %commit,
            "HEAD is detached; will return to the commit instead of a branch"
        );
        Ok(commit)
    }

    fn run_passes<F>(
        &self,
        state: &mut WorkflowState,
        baseline: &str,
        measure: &mut F,
    ) -> Result<(ResultSet, ResultSet)>
    where
        F: FnMut(Pass) -> Result<ResultSet>,
    {
        self.cancel.check("measure head")?;
        let head = measure(Pass::Head)?;
        state.phase = Phase::MeasuredHead;
        info!(benchmarks = head.len(), "Measured head");

        self.cancel.check("stash")?;
        state.had_changes = self.vcs.has_uncommitted_changes()?;
        if state.had_changes {
            state.stash = self.vcs.stash_push(&self.stash_marker)?;
            if state.stash.is_some() {
                state.phase = Phase::Stashed;
            }
        }

        self.cancel.check("checkout baseline")?;
        state.checkout_attempted = true;
        self.vcs.checkout(baseline)?;
        state.phase = Phase::CheckedOutBaseline;

        self.cancel.check("measure baseline")?;
        let baseline_results = measure(Pass::Baseline)?;
        state.phase = Phase::MeasuredBaseline;
        info!(benchmarks = baseline_results.len(), "Measured baseline");

        Ok((head, baseline_results))
    }
}

/// Run the workflow on the git repository at `repo_path`.
///
/// # Errors
///
/// See [`RevisionWorkflow::execute`].
pub fn execute<F>(
    repo_path: &Path,
    baseline: &str,
    cancel: CancelToken,
    measure: F,
) -> Result<Comparison>
where
    F: FnMut(Pass) -> Result<ResultSet>,
{
    RevisionWorkflow::new(Git::open(repo_path))
        .with_cancel(cancel)
        .execute(baseline, measure)
}

fn default_stash_marker() -> String {
    format!(
        "benchdiff-{}-{}",
        chrono::Utc::now().timestamp(),
        std::process::id()
    )
}

/// Undo actions for every phase reached; runs at most once.
struct RestoreGuard<'a, V: Vcs> {
    vcs: &'a V,
    state: WorkflowState,
    done: bool,
}

impl<'a, V: Vcs> RestoreGuard<'a, V> {
    fn new(vcs: &'a V, state: WorkflowState) -> Self {
        Self {
            vcs,
            state,
            done: false,
        }
    }

    fn restore(mut self) -> (WorkflowState, RestoreReport) {
        let report = self.run_restore();
        (std::mem::take(&mut self.state), report)
    }

    fn run_restore(&mut self) -> RestoreReport {
        self.done = true;
        let report = restore_workspace(self.vcs, &self.state);
        if report.is_clean() {
            self.state.phase = Phase::Restored;
        } else {
            error!(%report, "Workspace restore incomplete");
        }
        report
    }
}

impl<V: Vcs> Drop for RestoreGuard<'_, V> {
    fn drop(&mut self) {
        if !self.done {
            warn!("Restoring workspace after an interrupted workflow");
            let report = self.run_restore();
            if !report.is_clean() {
                eprintln!("Workspace restore incomplete: {report}");
                for step in report.remediation() {
                    eprintln!("  run: {step}");
                }
            }
        }
    }
}

/// Attempt every inverse action the state calls for.
fn restore_workspace<V: Vcs + ?Sized>(vcs: &V, state: &WorkflowState) -> RestoreReport {
    let return_to_original = if state.checkout_attempted {
        match vcs.checkout(&state.original_revision) {
            Ok(()) => StepOutcome::Succeeded,
            Err(e) => StepOutcome::Failed(e.to_string()),
        }
    } else {
        StepOutcome::NotNeeded
    };

    let restore_stash = match &state.stash {
        Some(entry) => match vcs.stash_pop(entry) {
            Ok(()) => StepOutcome::Succeeded,
            Err(e) => StepOutcome::Failed(e.to_string()),
        },
        None => StepOutcome::NotNeeded,
    };

    RestoreReport {
        original_revision: state.original_revision.clone(),
        stash_ref: state.stash.as_ref().map(|s| s.reference.clone()),
        stash_marker: state.stash.as_ref().map(|s| s.marker.clone()),
        return_to_original,
        restore_stash,
    }
}
