//! Git binding over the `git` executable.

use super::{StashEntry, Vcs};
use crate::error::{BenchDiffError, Result};
use crate::process::{CommandSpec, ProcessOutput, ProcessRunner, SystemRunner};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Git repository driven through a [`ProcessRunner`].
#[derive(Debug, Clone)]
pub struct Git<R: ProcessRunner = SystemRunner> {
    runner: R,
    repo: PathBuf,
}

impl Git<SystemRunner> {
    /// Git repository at `repo` using real child processes.
    #[must_use]
    pub fn open(repo: impl Into<PathBuf>) -> Self {
        Self::with_runner(SystemRunner, repo)
    }
}

impl<R: ProcessRunner> Git<R> {
    #[must_use]
    pub fn with_runner(runner: R, repo: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            repo: repo.into(),
        }
    }

    fn git<I, S>(&self, args: I) -> Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = CommandSpec::new("git", &self.repo).args(args);
        self.runner.run(&spec, None)
    }

    /// Find the stash whose subject contains `marker`.
    fn find_stash(&self, marker: &str) -> Result<Option<String>> {
        let out = self
            .git(["stash", "list", "--format=%gd%x09%s"])
            .map_err(|e| BenchDiffError::Stash {
                reason: failure_reason(&e),
            })?;
        Ok(parse_stash_list(&out.stdout_lines, marker))
    }
}

impl<R: ProcessRunner> Vcs for Git<R> {
    fn current_branch(&self) -> Result<Option<String>> {
        // `symbolic-ref -q` exits 1 without output on a detached HEAD.
        match self.git(["symbolic-ref", "--short", "-q", "HEAD"]) {
            Ok(out) => {
                let name = out.stdout_trimmed();
                Ok(if name.is_empty() { None } else { Some(name) })
            }
            Err(BenchDiffError::Process { exit_code: 1, .. }) => Ok(None),
            Err(e) => Err(BenchDiffError::RevisionResolution {
                reason: failure_reason(&e),
            }),
        }
    }

    fn head_commit(&self) -> Result<String> {
        let out = self
            .git(["rev-parse", "--verify", "HEAD"])
            .map_err(|e| BenchDiffError::RevisionResolution {
                reason: failure_reason(&e),
            })?;
        let commit = out.stdout_trimmed();
        if commit.is_empty() {
            return Err(BenchDiffError::RevisionResolution {
                reason: "git rev-parse returned no commit".to_string(),
            });
        }
        Ok(commit)
    }

    fn has_uncommitted_changes(&self) -> Result<bool> {
        let out = self.git(["status", "--porcelain"])?;
        let dirty = out.stdout_lines.iter().any(|l| !l.trim().is_empty());
        debug!(dirty, "Working tree status");
        Ok(dirty)
    }

    fn stash_push(&self, marker: &str) -> Result<Option<StashEntry>> {
        self.git(["stash", "push", "--include-untracked", "-m", marker])
            .map_err(|e| BenchDiffError::Stash {
                reason: failure_reason(&e),
            })?;

        match self.find_stash(marker) {
            Ok(Some(reference)) => {
                info!(%reference, marker, "Stashed uncommitted changes");
                Ok(Some(StashEntry {
                    marker: marker.to_string(),
                    reference,
                }))
            }
            Ok(None) => {
                debug!(marker, "git stash created no entry");
                Ok(None)
            }
            // The push succeeded, so an entry may exist; pop re-resolves it by marker.
            Err(e) => {
                warn!(marker, error = %e, "Could not locate stash after push");
                Ok(Some(StashEntry {
                    marker: marker.to_string(),
                    reference: "stash@{0}".to_string(),
                }))
            }
        }
    }

    fn checkout(&self, revision: &str) -> Result<()> {
        self.git(["checkout", "--quiet", revision])
            .map_err(|e| BenchDiffError::Checkout {
                revision: revision.to_string(),
                reason: failure_reason(&e),
            })?;
        info!(revision, "Checked out");
        Ok(())
    }

    fn stash_pop(&self, entry: &StashEntry) -> Result<()> {
        // Re-resolve: other stashes may have shifted the index since push.
        let reference = self.find_stash(&entry.marker)?.ok_or_else(|| BenchDiffError::Stash {
            reason: format!("no stash entry labelled {}", entry.marker),
        })?;
        self.git(["stash", "pop", reference.as_str()])
            .map_err(|e| BenchDiffError::Stash {
                reason: failure_reason(&e),
            })?;
        info!(%reference, "Restored stashed changes");
        Ok(())
    }
}

/// Parse `git stash list --format=%gd%x09%s` output.
fn parse_stash_list(lines: &[String], marker: &str) -> Option<String> {
    lines.iter().find_map(|line| {
        let (reference, subject) = line.split_once('\t')?;
        subject
            .contains(marker)
            .then(|| reference.trim().to_string())
    })
}

/// Short reason for a failed git invocation: its stderr, else the error.
fn failure_reason(err: &BenchDiffError) -> String {
    match err {
        BenchDiffError::Process { stderr, .. } if !stderr.trim().is_empty() => {
            stderr.trim().to_string()
        }
        other => other.to_string(),
    }
}
