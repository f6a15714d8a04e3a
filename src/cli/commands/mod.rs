//! Subcommand implementations.

pub mod compare;
pub mod completions;
pub mod run;

use crate::cli::Cli;
use crate::diff::DiffReport;
use crate::error::Result;
use crate::format::{ReportOutput, TextFormatOptions, render_report};
use crate::util::progress::ProgressMode;
use std::io::{self, IsTerminal, Write};

/// How results and progress are presented.
#[derive(Debug, Clone, Copy)]
pub struct OutputContext {
    pub json: bool,
    pub use_color: bool,
    pub progress: ProgressMode,
}

impl OutputContext {
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let progress = if cli.no_progress || cli.quiet {
            ProgressMode::Off
        } else {
            ProgressMode::Auto
        };
        Self {
            json: cli.json,
            use_color: !cli.no_color && !cli.json && io::stdout().is_terminal(),
            progress,
        }
    }
}

/// Revisions a report was produced from.
#[derive(Debug, Clone, Copy)]
pub struct Revisions<'a> {
    pub baseline: &'a str,
    pub head: &'a str,
}

/// Print `report` to stdout as tables or JSON.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn print_report(
    report: &DiffReport,
    revisions: Option<Revisions<'_>>,
    ctx: &OutputContext,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if ctx.json {
        let mut output = ReportOutput::new(report);
        if let Some(r) = revisions {
            output = output.with_revisions(r.baseline, r.head);
        }
        serde_json::to_writer_pretty(&mut out, &output)?;
        writeln!(out)?;
    } else {
        if let Some(r) = revisions {
            writeln!(out, "Comparing {} (head) against {} (baseline)\n", r.head, r.baseline)?;
        }
        render_report(
            report,
            TextFormatOptions {
                use_color: ctx.use_color,
            },
            &mut out,
        )?;
    }

    out.flush()?;
    Ok(())
}
