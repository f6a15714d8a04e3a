//! Run command: measure head and baseline, restore, compare.

use super::{OutputContext, Revisions, print_report};
use crate::cli::RunArgs;
use crate::collect::Collector;
use crate::config::{self, CompareConfig};
use crate::diff::diff;
use crate::error::{BenchDiffError, Result};
use crate::process::SystemRunner;
use crate::util::cancel::CancelToken;
use crate::workflow::{self, Pass};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{info, warn};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the repository path is invalid, the configuration
/// is invalid, any workflow step fails, or the report cannot be written.
pub fn execute(args: &RunArgs, ctx: &OutputContext) -> Result<()> {
    let repo = resolve_repo(&args.path)?;
    let mut overrides = args.overrides();
    // A directory given on the command line is relative to where bdiff runs.
    if let Some(dir) = overrides.artifacts_dir.take() {
        overrides.artifacts_dir = Some(absolute(&env::current_dir()?, &dir));
    }
    let config = config::load_config(&repo, &overrides)?;
    info!(
        repo = %repo.display(),
        baseline = %config.baseline,
        threshold = config.threshold_percent,
        filter = %config.filter,
        tool = %config.tool,
        "Starting run"
    );

    // Held until the end of the command; removed on drop.
    let (artifacts_dir, _temp) = artifacts_location(&config, &repo)?;
    let cancel = CancelToken::install()?;

    let collector = Collector::new(SystemRunner, config.tool.clone(), artifacts_dir)
        .with_progress(ctx.progress)
        .with_cancel(cancel.clone());

    let comparison = workflow::execute(&repo, &config.baseline, cancel, |pass| {
        info!(pass = pass.as_str(), "Collecting benchmarks");
        let results = collector.collect(&repo, &config.filter, config.naming)?;
        if results.is_empty() && pass == Pass::Head {
            warn!("No benchmark results for the working tree");
        }
        Ok(results)
    })?;

    let report = diff(
        &comparison.baseline,
        &comparison.head,
        config.threshold_percent,
    );
    print_report(
        &report,
        Some(Revisions {
            baseline: &config.baseline,
            head: &comparison.original_revision,
        }),
        ctx,
    )
}

fn resolve_repo(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(BenchDiffError::Config(format!(
            "repository path {} does not exist or is not a directory",
            path.display()
        )));
    }
    Ok(fs::canonicalize(path)?)
}

fn absolute(base: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        base.join(dir)
    }
}

/// Where exports go: the configured directory or a fresh temporary one.
///
/// A relative configured directory is relative to the repository.
fn artifacts_location(config: &CompareConfig, repo: &Path) -> Result<(PathBuf, Option<TempDir>)> {
    if let Some(dir) = &config.artifacts_dir {
        let mut dir = absolute(repo, dir);
        if dir.exists() {
            dir = fs::canonicalize(&dir)?;
        }
        if dir.starts_with(repo) {
            warn!(
                dir = %dir.display(),
                "Artifacts directory is inside the repository; exports are removed after each pass"
            );
        }
        return Ok((dir, None));
    }

    let temp = tempfile::Builder::new().prefix("benchdiff-").tempdir()?;
    Ok((temp.path().to_path_buf(), Some(temp)))
}
