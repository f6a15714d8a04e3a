//! Output formatting for `benchdiff`.
//!
//! Supports human-readable tables and machine-parseable JSON. Tables go to
//! stdout; diagnostics always go to stderr.
//!
//! # Output Types
//!
//! - [`ReportOutput`] - the `--json` document
//! - [`ComparedBenchmark`] - a benchmark present in both runs
//! - [`SingleBenchmark`] - a benchmark present in one run

mod output;
mod report;
mod text;

pub use output::{ComparedBenchmark, ReportOutput, ReportSummary, SingleBenchmark};
pub use report::{render_report, report_to_string, summary_line};
pub use text::{
    Align, Table, TextFormatOptions, Tone, format_bytes, format_delta, format_ratio, format_time,
    visible_len,
};
