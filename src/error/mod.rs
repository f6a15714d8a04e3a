//! Error types and handling for `benchdiff`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Supports `anyhow` integration for ad-hoc failures
//! - Provides recovery hints for user-facing errors
//! - Restoration failures always carry the state needed for manual recovery

mod structured;

pub use structured::{ErrorCode, StructuredError};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `benchdiff` operations.
#[derive(Error, Debug)]
pub enum BenchDiffError {
    // === Version control errors ===
    /// The repository has no resolvable current revision.
    #[error("Could not resolve the current revision: {reason}")]
    RevisionResolution { reason: String },

    /// Switching the working tree to a revision failed.
    #[error("Checkout of '{revision}' failed: {reason}")]
    Checkout { revision: String, reason: String },

    /// Saving uncommitted changes failed.
    #[error("Stashing uncommitted changes failed: {reason}")]
    Stash { reason: String },

    /// Returning the working tree to its original state failed.
    #[error("Workspace restore incomplete: {report}")]
    Restore { report: RestoreReport },

    /// A workflow step failed and the restore that followed also failed.
    #[error("{cause}; additionally, workspace restore incomplete: {report}")]
    WorkflowAborted {
        cause: Box<BenchDiffError>,
        report: RestoreReport,
    },

    // === Process errors ===
    /// An external command exited with a non-zero status.
    #[error("Command `{command}` failed with exit code {exit_code}")]
    Process {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    /// An external command could not be started at all.
    #[error("Could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // === Measurement errors ===
    /// A structured benchmark export could not be parsed.
    #[error("Malformed benchmark export '{path}': {reason}")]
    ExportParse { path: PathBuf, reason: String },

    /// The run was interrupted by the user.
    #[error("Interrupted")]
    Cancelled,

    // === Configuration errors ===
    /// Configuration value or path error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Outcome of one restoration sub-step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step was not required (nothing to undo).
    NotNeeded,
    /// The step ran and succeeded.
    Succeeded,
    /// The step ran and failed.
    Failed(String),
}

impl StepOutcome {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNeeded => f.write_str("not needed"),
            Self::Succeeded => f.write_str("ok"),
            Self::Failed(reason) => write!(f, "FAILED ({reason})"),
        }
    }
}

/// What restoration did, sub-step by sub-step.
///
/// Carries the original revision and the stash reference so a user can
/// finish the job by hand when a step failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub original_revision: String,
    pub stash_ref: Option<String>,
    pub stash_marker: Option<String>,
    pub return_to_original: StepOutcome,
    pub restore_stash: StepOutcome,
}

impl RestoreReport {
    /// True when no sub-step failed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !self.return_to_original.is_failed() && !self.restore_stash.is_failed()
    }

    /// Shell commands that complete the restore manually.
    #[must_use]
    pub fn remediation(&self) -> Vec<String> {
        let mut steps = Vec::new();
        if self.return_to_original.is_failed() {
            steps.push(format!("git checkout {}", self.original_revision));
        }
        if self.restore_stash.is_failed() {
            match &self.stash_ref {
                Some(stash_ref) => steps.push(format!("git stash pop {stash_ref}")),
                None => steps.push("git stash list".to_string()),
            }
        }
        steps
    }
}

impl fmt::Display for RestoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "return to '{}': {}; restore stashed changes",
            self.original_revision, self.return_to_original
        )?;
        if let Some(stash_ref) = &self.stash_ref {
            write!(f, " ({stash_ref})")?;
        }
        write!(f, ": {}", self.restore_stash)
    }
}

impl BenchDiffError {
    /// Restoration report attached to this error, if any.
    #[must_use]
    pub const fn restore_report(&self) -> Option<&RestoreReport> {
        match self {
            Self::Restore { report } | Self::WorkflowAborted { report, .. } => Some(report),
            _ => None,
        }
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::RevisionResolution { .. } => {
                Some("Check that the path is a git repository with at least one commit")
            }
            Self::Checkout { .. } => {
                Some("Check the baseline revision name (see: git branch -a, git tag)")
            }
            Self::Stash { .. } => Some("Commit or discard your changes, then retry"),
            Self::Spawn { .. } => Some("Make sure the tool is installed and on PATH"),
            Self::Config(_) => Some("Check .benchdiff.yaml, BENCHDIFF_* variables and flags"),
            _ => None,
        }
    }

    /// Wrap a failure in a `WorkflowAborted` when restoration also failed.
    #[must_use]
    pub fn with_restore(self, report: RestoreReport) -> Self {
        if report.is_clean() {
            self
        } else {
            Self::WorkflowAborted {
                cause: Box::new(self),
                report,
            }
        }
    }
}

/// Result type using `BenchDiffError`.
pub type Result<T> = std::result::Result<T, BenchDiffError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn report(checkout: StepOutcome, stash: StepOutcome) -> RestoreReport {
        RestoreReport {
            original_revision: "feature/x".to_string(),
            stash_ref: Some("stash@{0}".to_string()),
            stash_marker: Some("benchdiff-1-2".to_string()),
            return_to_original: checkout,
            restore_stash: stash,
        }
    }

    #[test]
    fn test_error_display() {
        let err = BenchDiffError::Checkout {
            revision: "main".to_string(),
            reason: "pathspec 'main' did not match".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Checkout of 'main' failed: pathspec 'main' did not match"
        );
    }

    #[test]
    fn test_restore_report_display() {
        let r = report(
            StepOutcome::Succeeded,
            StepOutcome::Failed("conflict".to_string()),
        );
        assert_eq!(
            r.to_string(),
            "return to 'feature/x': ok; restore stashed changes (stash@{0}): FAILED (conflict)"
        );
        assert!(!r.is_clean());
    }

    #[test]
    fn test_remediation_names_only_failed_steps() {
        let r = report(
            StepOutcome::Failed("locked".to_string()),
            StepOutcome::Succeeded,
        );
        assert_eq!(r.remediation(), vec!["git checkout feature/x".to_string()]);

        let r = report(
            StepOutcome::Failed("locked".to_string()),
            StepOutcome::Failed("conflict".to_string()),
        );
        assert_eq!(
            r.remediation(),
            vec![
                "git checkout feature/x".to_string(),
                "git stash pop stash@{0}".to_string()
            ]
        );
    }

    #[test]
    fn test_with_restore_keeps_cause_when_clean() {
        let cause = BenchDiffError::Cancelled;
        let clean = report(StepOutcome::Succeeded, StepOutcome::NotNeeded);
        assert!(matches!(
            cause.with_restore(clean),
            BenchDiffError::Cancelled
        ));
    }

    #[test]
    fn test_with_restore_aggregates_when_dirty() {
        let cause = BenchDiffError::Checkout {
            revision: "main".to_string(),
            reason: "conflict".to_string(),
        };
        let dirty = report(
            StepOutcome::Succeeded,
            StepOutcome::Failed("conflict".to_string()),
        );
        let err = cause.with_restore(dirty);
        assert!(matches!(err, BenchDiffError::WorkflowAborted { .. }));
        assert!(err.restore_report().is_some());
        assert!(err.to_string().starts_with("Checkout of 'main' failed"));
    }

    #[test]
    fn test_suggestion() {
        let err = BenchDiffError::Stash {
            reason: "x".to_string(),
        };
        assert_eq!(
            err.suggestion(),
            Some("Commit or discard your changes, then retry")
        );
        assert_eq!(BenchDiffError::Cancelled.suggestion(), None);
    }
}
