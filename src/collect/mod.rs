//! Benchmark collection: discover projects, run the tool, parse exports.
//!
//! One [`Collector::collect`] call produces the [`ResultSet`] for a single
//! pass over the working tree. Every project's exports land in a
//! `benchdiff-artifacts` directory under the configured location. Only
//! that directory is ever emptied, before each invocation, so an export is
//! always attributed to the run that wrote it.

pub mod discovery;
pub mod export;

pub use discovery::{Discovery, DiscoveryWarning, discover_projects};
pub use export::{parse_export, read_export, read_exports_dir};

use crate::error::{BenchDiffError, Result};
use crate::model::{NamingMode, ResultSet};
use crate::process::{CommandSpec, ProcessRunner, SystemRunner};
use crate::util::cancel::CancelToken;
use crate::util::progress::ProgressMode;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default measurement front-end.
pub const DEFAULT_TOOL: &str = "dotnet";

/// Directory the collector owns under the configured artifacts location.
pub const ARTIFACTS_SUBDIR: &str = "benchdiff-artifacts";

/// Runs the measurement tool over every benchmark project under a root.
pub struct Collector<R: ProcessRunner = SystemRunner> {
    runner: R,
    tool: String,
    work_dir: PathBuf,
    progress: ProgressMode,
    cancel: CancelToken,
}

impl<R: ProcessRunner> Collector<R> {
    /// Exports go to `<artifacts_dir>/benchdiff-artifacts`; nothing else
    /// under `artifacts_dir` is touched.
    #[must_use]
    pub fn new(runner: R, tool: impl Into<String>, artifacts_dir: impl AsRef<Path>) -> Self {
        Self {
            runner,
            tool: tool.into(),
            work_dir: artifacts_dir.as_ref().join(ARTIFACTS_SUBDIR),
            progress: ProgressMode::Off,
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub const fn with_progress(mut self, progress: ProgressMode) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Measure every benchmark project under `root`.
    ///
    /// No projects is not an error; the result is simply empty.
    ///
    /// # Errors
    ///
    /// Fails if the artifacts directory contains `root`, the tool fails for
    /// any project, or an export is malformed.
    pub fn collect(&self, root: &Path, filter: &str, naming: NamingMode) -> Result<ResultSet> {
        if root.starts_with(&self.work_dir) {
            return Err(BenchDiffError::Config(format!(
                "artifacts directory {} contains the repository {}",
                self.work_dir.display(),
                root.display()
            )));
        }
        let outcome = self.collect_projects(root, filter, naming);

        // Exports left inside the tree would be stashed with the user's changes.
        let cleanup = if self.work_dir.starts_with(root) && self.work_dir.exists() {
            fs::remove_dir_all(&self.work_dir)
        } else {
            Ok(())
        };
        let results = outcome?;
        cleanup?;
        Ok(results)
    }

    fn collect_projects(&self, root: &Path, filter: &str, naming: NamingMode) -> Result<ResultSet> {
        clear_dir(&self.work_dir)?;

        let Discovery { projects, warnings } = discover_projects(root);
        if projects.is_empty() {
            info!(root = %root.display(), "No benchmark projects found");
            return Ok(ResultSet::new());
        }
        info!(
            projects = projects.len(),
            skipped = warnings.len(),
            "Discovered benchmark projects"
        );

        let mut results = ResultSet::new();
        for project in &projects {
            self.cancel.check("benchmark run")?;
            results.merge(self.run_project(project, filter, naming)?);
        }
        Ok(results)
    }

    fn run_project(&self, project: &Path, filter: &str, naming: NamingMode) -> Result<ResultSet> {
        clear_dir(&self.work_dir)?;

        let cwd = project.parent().unwrap_or_else(|| Path::new("."));
        let spec = self.command_for(project, filter, cwd);
        let label = project
            .file_stem()
            .map_or_else(|| project.display().to_string(), |s| s.to_string_lossy().into_owned());

        info!(project = %project.display(), "Running benchmarks");
        let sink = self.progress.sink(&label);
        self.runner.run(&spec, Some(sink.as_ref()))?;

        let results = read_exports_dir(&self.work_dir.join("results"), naming)?;
        debug!(project = %project.display(), benchmarks = results.len(), "Collected results");
        Ok(results)
    }

    fn command_for(&self, project: &Path, filter: &str, cwd: &Path) -> CommandSpec {
        CommandSpec::new(&self.tool, cwd)
            .args(["run", "-c", "Release", "--project"])
            .arg(project.display().to_string())
            .args(["--", "--filter", filter, "--exporters", "json", "--artifacts"])
            .arg(self.work_dir.display().to_string())
    }
}

/// Ensure `dir` exists and is empty.
fn clear_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
    } else {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
