//! Structured error output.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for manual recovery
//! - Context for debugging

use crate::error::{BenchDiffError, RestoreReport};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
/// Format: `SCREAMING_SNAKE_CASE` for easy parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Version control (exit code 2) ===
    /// No resolvable current revision
    RevisionResolutionFailed,
    /// Checkout of a revision failed
    CheckoutFailed,
    /// Stashing uncommitted changes failed
    StashFailed,

    // === Restore (exit code 3) ===
    /// Workspace could not be fully restored
    RestoreFailed,

    // === External processes (exit code 4) ===
    /// Command exited non-zero
    ProcessFailed,
    /// Command could not be started
    SpawnFailed,

    // === Measurement data (exit code 5) ===
    /// Structured export was malformed
    ExportParseFailed,

    // === Config Errors (exit code 6) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 7) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,

    // === Interrupted (exit code 130) ===
    /// User pressed Ctrl-C
    Cancelled,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RevisionResolutionFailed => "REVISION_RESOLUTION_FAILED",
            Self::CheckoutFailed => "CHECKOUT_FAILED",
            Self::StashFailed => "STASH_FAILED",
            Self::RestoreFailed => "RESTORE_FAILED",
            Self::ProcessFailed => "PROCESS_FAILED",
            Self::SpawnFailed => "SPAWN_FAILED",
            Self::ExportParseFailed => "EXPORT_PARSE_FAILED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Version control errors
    /// - 3: Restore failures (working tree may need manual recovery)
    /// - 4: External process errors
    /// - 5: Export parse errors
    /// - 6: Config errors
    /// - 7: I/O errors
    /// - 130: Interrupted
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::RevisionResolutionFailed | Self::CheckoutFailed | Self::StashFailed => 2,
            Self::RestoreFailed => 3,
            Self::ProcessFailed | Self::SpawnFailed => 4,
            Self::ExportParseFailed => 5,
            Self::ConfigError => 6,
            Self::IoError | Self::JsonError => 7,
            Self::Cancelled => 130,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `BenchDiffError`.
    #[must_use]
    pub fn from_error(err: &BenchDiffError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = Self::generate_hint(err);

        Self {
            code,
            message: err.to_string(),
            hint,
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &BenchDiffError) -> (ErrorCode, Option<Value>) {
        match err {
            BenchDiffError::RevisionResolution { reason } => (
                ErrorCode::RevisionResolutionFailed,
                Some(json!({"reason": reason})),
            ),
            BenchDiffError::Checkout { revision, reason } => (
                ErrorCode::CheckoutFailed,
                Some(json!({"revision": revision, "reason": reason})),
            ),
            BenchDiffError::Stash { reason } => {
                (ErrorCode::StashFailed, Some(json!({"reason": reason})))
            }
            BenchDiffError::Restore { report } => {
                (ErrorCode::RestoreFailed, Some(restore_context(report, None)))
            }
            BenchDiffError::WorkflowAborted { cause, report } => (
                ErrorCode::RestoreFailed,
                Some(restore_context(report, Some(cause.as_ref()))),
            ),
            BenchDiffError::Process {
                command,
                exit_code,
                stderr,
            } => (
                ErrorCode::ProcessFailed,
                Some(json!({
                    "command": command,
                    "exit_code": exit_code,
                    "stderr": stderr,
                })),
            ),
            BenchDiffError::Spawn { command, .. } => {
                (ErrorCode::SpawnFailed, Some(json!({"command": command})))
            }
            BenchDiffError::ExportParse { path, reason } => (
                ErrorCode::ExportParseFailed,
                Some(json!({"path": path.display().to_string(), "reason": reason})),
            ),
            BenchDiffError::Cancelled => (ErrorCode::Cancelled, None),
            BenchDiffError::Config(_) => (ErrorCode::ConfigError, None),
            BenchDiffError::Io(_) => (ErrorCode::IoError, None),
            BenchDiffError::Json(_) => (ErrorCode::JsonError, None),
            BenchDiffError::Other(_) => (ErrorCode::InternalError, None),
        }
    }

    fn generate_hint(err: &BenchDiffError) -> Option<String> {
        if let Some(report) = err.restore_report() {
            let steps = report.remediation();
            return Some(format!(
                "Your working tree was not fully restored. Run manually: {}",
                steps.join(" && ")
            ));
        }

        match err {
            BenchDiffError::Process { stderr, .. } => {
                let tail = last_lines(stderr, 5);
                if tail.is_empty() {
                    None
                } else {
                    Some(format!("Command output (stderr):\n{tail}"))
                }
            }
            _ => err.suggestion().map(str::to_string),
        }
    }
}

fn restore_context(report: &RestoreReport, cause: Option<&BenchDiffError>) -> Value {
    json!({
        "original_revision": report.original_revision,
        "stash_ref": report.stash_ref,
        "stash_marker": report.stash_marker,
        "return_to_original": report.return_to_original.to_string(),
        "restore_stash": report.restore_stash.to_string(),
        "cause": cause.map(ToString::to_string),
    })
}

fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
