//! Rendering of a [`DiffReport`] as section tables.

use super::text::{
    Align, Table, TextFormatOptions, Tone, format_bytes, format_delta, format_ratio, format_time,
};
use crate::diff::{DiffRecord, DiffReport, SingleRecord};
use colored::Colorize;
use std::io::{self, Write};

const TIME_COLUMNS: [(&str, Align); 4] = [
    ("Benchmark", Align::Left),
    ("Baseline", Align::Right),
    ("Head", Align::Right),
    ("Ratio", Align::Right),
];

const ALLOCATION_COLUMNS: [(&str, Align); 4] = [
    ("Benchmark", Align::Left),
    ("Baseline", Align::Right),
    ("Head", Align::Right),
    ("Delta", Align::Right),
];

const SINGLE_COLUMNS: [(&str, Align); 3] = [
    ("Benchmark", Align::Left),
    ("Mean", Align::Right),
    ("Allocated", Align::Right),
];

fn time_table(records: &[DiffRecord], tone: Tone) -> Table {
    let mut table = Table::new(&TIME_COLUMNS);
    for r in records {
        table.push(
            vec![
                r.identity.clone(),
                format_time(r.baseline.mean_ns),
                format_time(r.head.mean_ns),
                format_ratio(r.ratio()),
            ],
            tone,
        );
    }
    table
}

fn allocation_table(records: &[DiffRecord], tone: Tone) -> Table {
    let mut table = Table::new(&ALLOCATION_COLUMNS);
    for r in records {
        table.push(
            vec![
                r.identity.clone(),
                format_bytes(r.baseline.allocated_bytes),
                format_bytes(r.head.allocated_bytes),
                format_delta(r.allocation_delta()),
            ],
            tone,
        );
    }
    table
}

fn single_table(records: &[SingleRecord]) -> Table {
    let mut table = Table::new(&SINGLE_COLUMNS);
    for r in records {
        table.push(
            vec![
                r.identity.clone(),
                format_time(r.measurement.mean_ns),
                format_bytes(r.measurement.allocated_bytes),
            ],
            Tone::Plain,
        );
    }
    table
}

/// One-line counts shown under the tables.
#[must_use]
pub fn summary_line(report: &DiffReport) -> String {
    format!(
        "{} faster, {} slower, {} below the {}% threshold, {} with identical allocation",
        report.faster.len(),
        report.slower.len(),
        report.below_threshold,
        report.threshold_percent,
        report.identical_allocation,
    )
}

/// Write every section of `report`, in order, then the summary.
///
/// Every section is present even when it has no rows.
///
/// # Errors
///
/// Returns any error from `out`.
pub fn render_report(
    report: &DiffReport,
    options: TextFormatOptions,
    out: &mut impl Write,
) -> io::Result<()> {
    let sections = [
        ("Faster", time_table(&report.faster, Tone::Good)),
        ("Slower", time_table(&report.slower, Tone::Bad)),
        (
            "Less allocation",
            allocation_table(&report.less_allocation, Tone::Good),
        ),
        (
            "More allocation",
            allocation_table(&report.more_allocation, Tone::Bad),
        ),
        ("Only in head", single_table(&report.only_in_head)),
        ("Only in baseline", single_table(&report.only_in_baseline)),
    ];

    for (title, table) in &sections {
        let heading = format!("## {title}");
        if options.use_color {
            writeln!(out, "{}", heading.bold())?;
        } else {
            writeln!(out, "{heading}")?;
        }
        writeln!(out)?;
        for line in table.render(options) {
            writeln!(out, "{line}")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{}", summary_line(report))
}

/// Render `report` to a string.
#[must_use]
pub fn report_to_string(report: &DiffReport, options: TextFormatOptions) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = render_report(report, options, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
