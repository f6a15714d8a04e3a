//! `benchdiff` - A/B benchmark comparison against a baseline git revision.
//!
//! Runs a project's benchmark suite on the current working tree, switches
//! to a baseline revision, runs it again, puts the working tree back the
//! way it was, and reports which benchmarks got faster, slower, or changed
//! allocation behavior.
//!
//! Layering, leaves first:
//! - [`process`]: external command execution with captured output
//! - [`vcs`]: version-control operations (git) behind a trait seam
//! - [`workflow`]: the checkout/stash/restore state machine
//! - [`collect`]: project discovery, tool invocation, export parsing
//! - [`diff`]: matching and classification of two result sets
//! - [`format`]: table and JSON rendering of a diff report

pub mod cli;
pub mod collect;
pub mod config;
pub mod diff;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod process;
pub mod util;
pub mod vcs;
pub mod workflow;

pub use error::{BenchDiffError, ErrorCode, Result, StructuredError};
