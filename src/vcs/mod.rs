//! Version-control operations used by the comparison workflow.
//!
//! The workflow only talks to [`Vcs`]; [`git::Git`] is the real binding.
//! Keeping the seam narrow lets the workflow state machine be tested
//! against an in-memory fake.

pub mod git;

pub use git::Git;

use crate::error::Result;

/// A stash created by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    /// Label the stash was saved with.
    pub marker: String,
    /// Reference the stash can be popped by (e.g. `stash@{0}`).
    pub reference: String,
}

/// Operations the workflow needs from a version-control system.
pub trait Vcs {
    /// Symbolic name of the checked-out branch, `None` on a detached HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be queried.
    fn current_branch(&self) -> Result<Option<String>>;

    /// Commit id of HEAD.
    ///
    /// # Errors
    ///
    /// Returns an error if HEAD does not resolve (e.g. no commits yet).
    fn head_commit(&self) -> Result<String>;

    /// Whether the working tree has tracked or untracked changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the status cannot be read.
    fn has_uncommitted_changes(&self) -> Result<bool>;

    /// Stash all changes (untracked included) under `marker`.
    ///
    /// Returns `None` when the VCS reported nothing to stash.
    ///
    /// # Errors
    ///
    /// Returns `BenchDiffError::Stash` on failure.
    fn stash_push(&self, marker: &str) -> Result<Option<StashEntry>>;

    /// Switch the working tree to `revision`.
    ///
    /// # Errors
    ///
    /// Returns `BenchDiffError::Checkout` on failure.
    fn checkout(&self, revision: &str) -> Result<()>;

    /// Re-apply and drop a stash created by [`Vcs::stash_push`].
    ///
    /// # Errors
    ///
    /// Returns `BenchDiffError::Stash` on failure.
    fn stash_pop(&self, entry: &StashEntry) -> Result<()>;
}

impl<V: Vcs + ?Sized> Vcs for &V {
    fn current_branch(&self) -> Result<Option<String>> {
        (**self).current_branch()
    }

    fn head_commit(&self) -> Result<String> {
        (**self).head_commit()
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        (**self).has_uncommitted_changes()
    }

    fn stash_push(&self, marker: &str) -> Result<Option<StashEntry>> {
        (**self).stash_push(marker)
    }

    fn checkout(&self, revision: &str) -> Result<()> {
        (**self).checkout(revision)
    }

    fn stash_pop(&self, entry: &StashEntry) -> Result<()> {
        (**self).stash_pop(entry)
    }
}
