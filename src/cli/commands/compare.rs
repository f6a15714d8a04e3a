//! Compare command: diff two directories of existing exports.
//!
//! Uses the same export parser and diff engine as `run`, without touching
//! git or running the benchmark tool.

use super::{OutputContext, print_report};
use crate::cli::CompareArgs;
use crate::collect::read_exports_dir;
use crate::config;
use crate::diff::diff;
use crate::error::{BenchDiffError, Result};
use std::path::Path;
use tracing::info;

/// Execute the compare command.
///
/// # Errors
///
/// Returns an error if a directory is missing, an export is malformed, or
/// the configuration is invalid.
pub fn execute(args: &CompareArgs, ctx: &OutputContext) -> Result<()> {
    for dir in [&args.baseline_dir, &args.head_dir] {
        if !dir.is_dir() {
            return Err(BenchDiffError::Config(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    }

    let config = config::load_config(Path::new("."), &args.overrides())?;
    let baseline = read_exports_dir(&args.baseline_dir, config.naming)?;
    let head = read_exports_dir(&args.head_dir, config.naming)?;
    info!(
        baseline = baseline.len(),
        head = head.len(),
        threshold = config.threshold_percent,
        "Comparing exports"
    );

    let report = diff(&baseline, &head, config.threshold_percent);
    print_report(&report, None, ctx)
}
