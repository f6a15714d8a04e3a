//! CLI definitions and entry point.

use crate::config::CliOverrides;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// A/B benchmark comparison against a baseline git revision
#[derive(Parser, Debug)]
#[command(name = "bdiff", author, version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Disable live progress from the benchmark tool
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Also write JSON logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Benchmark the working tree and a baseline revision, then compare
    Run(RunArgs),

    /// Compare two directories of existing benchmark exports
    Compare(CompareArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the run command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Repository to benchmark
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Revision to compare against [default: main]
    #[arg(long, short = 'b')]
    pub baseline: Option<String>,

    /// Minimum percent change to report [default: 1.0]
    #[arg(long, short = 't', value_name = "PCT")]
    pub threshold: Option<f64>,

    /// Benchmark filter passed to the tool [default: *]
    #[arg(long, short = 'f', value_name = "EXPR")]
    pub filter: Option<String>,

    /// Identify benchmarks by fully qualified name
    #[arg(long)]
    pub full_names: bool,

    /// Identify benchmarks by type and method, overriding config
    #[arg(long, conflicts_with = "full_names")]
    pub no_full_names: bool,

    /// Benchmark tool executable [default: dotnet]
    #[arg(long, value_name = "CMD")]
    pub tool: Option<String>,

    /// Directory for tool exports (default: a private temporary directory)
    #[arg(long, value_name = "DIR")]
    pub artifacts_dir: Option<PathBuf>,
}

impl RunArgs {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            baseline: self.baseline.clone(),
            threshold: self.threshold,
            filter: self.filter.clone(),
            full_names: full_names_override(self.full_names, self.no_full_names),
            tool: self.tool.clone(),
            artifacts_dir: self.artifacts_dir.clone(),
        }
    }
}

fn full_names_override(full_names: bool, no_full_names: bool) -> Option<bool> {
    if full_names {
        Some(true)
    } else if no_full_names {
        Some(false)
    } else {
        None
    }
}

/// Arguments for the compare command.
#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Directory holding the baseline exports
    pub baseline_dir: PathBuf,

    /// Directory holding the head exports
    pub head_dir: PathBuf,

    /// Minimum percent change to report [default: 1.0]
    #[arg(long, short = 't', value_name = "PCT")]
    pub threshold: Option<f64>,

    /// Identify benchmarks by fully qualified name
    #[arg(long)]
    pub full_names: bool,

    /// Identify benchmarks by type and method, overriding config
    #[arg(long, conflicts_with = "full_names")]
    pub no_full_names: bool,
}

impl CompareArgs {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            threshold: self.threshold,
            full_names: full_names_override(self.full_names, self.no_full_names),
            ..CliOverrides::default()
        }
    }
}

/// Arguments for the completions command.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    /// Elvish
    Elvish,
}
