//! Progress reporting for long-running external commands.
//!
//! Provides:
//! - [`ProgressSink`]: the capability the process layer reports through
//! - A spinner backend that overwrites one line in place
//! - A line backend that appends to stderr (non-interactive sessions)
//! - A null backend
//! - Conditional selection based on terminal detection

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, stderr};
use std::time::Duration;

/// Receives live output from a running command.
pub trait ProgressSink {
    /// Report the latest output line.
    fn update(&self, line: &str);
    /// The command finished.
    fn finish(&self);
}

/// Check if we should show progress indicators.
///
/// Progress is shown only if stderr is an interactive terminal.
/// This respects piped output and non-interactive environments.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Create a spinner for indeterminate operations.
///
/// # Arguments
/// * `message` - Message to display alongside the spinner
/// * `show` - Whether to actually show the spinner (use `should_show_progress()`)
///
/// # Panics
/// Panics if the spinner template string is invalid.
#[must_use]
pub fn create_spinner(message: &str, show: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();

    if show {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed}] {prefix:.bold} {wide_msg}")
                .expect("valid template"),
        );
        pb.set_prefix(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// Single overwritten status line; replaced by a done marker at the end.
pub struct SpinnerSink {
    bar: ProgressBar,
    label: String,
}

impl SpinnerSink {
    #[must_use]
    pub fn new(label: &str, show: bool) -> Self {
        Self {
            bar: create_spinner(label, show),
            label: label.to_string(),
        }
    }
}

impl ProgressSink for SpinnerSink {
    fn update(&self, line: &str) {
        self.bar.set_message(line.trim().to_string());
    }

    fn finish(&self) {
        self.bar.set_style(
            ProgressStyle::default_spinner()
                .template("{prefix:.green} {msg}")
                .expect("valid template"),
        );
        self.bar.set_prefix("✓");
        self.bar.finish_with_message(format!("{} done", self.label));
    }
}

/// Appends each line to stderr, prefixed with a label.
pub struct LineSink {
    label: String,
}

impl LineSink {
    #[must_use]
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl ProgressSink for LineSink {
    fn update(&self, line: &str) {
        eprintln!("[{}] {}", self.label, line);
    }

    fn finish(&self) {
        eprintln!("[{}] done", self.label);
    }
}

/// Discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn update(&self, _line: &str) {}

    fn finish(&self) {}
}

/// How live command output is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Spinner when stderr is a terminal, appended lines otherwise.
    Auto,
    /// Stream every line to stderr.
    Lines,
    /// No live output.
    Off,
}

/// Backend a [`ProgressMode`] resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Spinner,
    Lines,
    Null,
}

impl ProgressMode {
    /// Backend for this mode given whether stderr is interactive.
    #[must_use]
    pub const fn sink_kind(self, interactive: bool) -> SinkKind {
        match self {
            Self::Auto if interactive => SinkKind::Spinner,
            Self::Auto | Self::Lines => SinkKind::Lines,
            Self::Off => SinkKind::Null,
        }
    }

    /// Build a sink for a command labeled `label`.
    #[must_use]
    pub fn sink(self, label: &str) -> Box<dyn ProgressSink> {
        match self.sink_kind(should_show_progress()) {
            SinkKind::Spinner => Box::new(SpinnerSink::new(label, true)),
            SinkKind::Lines => Box::new(LineSink::new(label)),
            SinkKind::Null => Box::new(NullSink),
        }
    }
}
