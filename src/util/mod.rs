//! Shared utilities for `benchdiff`.
//!
//! - Progress indicators (for long-running external commands)
//! - Cancellation flag wired to Ctrl-C

pub mod cancel;
pub mod progress;

pub use cancel::CancelToken;
pub use progress::{LineSink, NullSink, ProgressMode, ProgressSink, SinkKind, SpinnerSink};
