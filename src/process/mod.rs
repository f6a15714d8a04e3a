//! External command execution.
//!
//! Every git operation and every measurement-tool invocation goes through
//! [`ProcessRunner`]. A call blocks until the child exits; stdout is captured
//! line by line (optionally mirrored to a [`ProgressSink`]) and stderr is
//! captured as one block.

use crate::error::{BenchDiffError, Result};
use crate::util::progress::ProgressSink;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, trace};

/// A command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    #[must_use]
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Command line for messages.
    #[must_use]
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push_str(&format!("'{arg}'"));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Stdout lines in arrival order.
    pub stdout_lines: Vec<String>,
    pub stderr: String,
    pub exit_code: i32,
}

impl ProcessOutput {
    /// Stdout joined back into one string, trimmed.
    #[must_use]
    pub fn stdout_trimmed(&self) -> String {
        self.stdout_lines.join("\n").trim().to_string()
    }
}

/// Runs external commands.
pub trait ProcessRunner {
    /// Run `spec` to completion.
    ///
    /// A zero exit code is success regardless of stderr content.
    ///
    /// # Errors
    ///
    /// `BenchDiffError::Spawn` if the program cannot be started,
    /// `BenchDiffError::Process` on a non-zero exit.
    fn run(&self, spec: &CommandSpec, progress: Option<&dyn ProgressSink>)
    -> Result<ProcessOutput>;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(
        &self,
        spec: &CommandSpec,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ProcessOutput> {
        (**self).run(spec, progress)
    }
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        spec: &CommandSpec,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ProcessOutput> {
        let command_line = spec.display();
        debug!(command = %command_line, cwd = %spec.cwd.display(), "Running command");

        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BenchDiffError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        // Drain stderr concurrently so a chatty child cannot block on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = String::new();
                let _ = pipe.read_to_string(&mut buf);
                buf
            })
        });

        let mut stdout_lines = Vec::new();
        let mut read_error = None;
        if let Some(stdout) = child.stdout.take() {
            // Tool output is not guaranteed to be UTF-8; decode each line lossily.
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {
                        let line = String::from_utf8_lossy(&buf);
                        let line = line.trim_end_matches(['\n', '\r']).to_string();
                        trace!(line = %line, "stdout");
                        if let Some(sink) = progress {
                            sink.update(&line);
                        }
                        stdout_lines.push(line);
                    }
                    Err(e) => {
                        read_error = Some(e);
                        break;
                    }
                }
            }
        }

        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if let Some(sink) = progress {
            sink.finish();
        }

        let exit_code = status.code().unwrap_or(-1);
        debug!(command = %command_line, exit_code, lines = stdout_lines.len(), "Command finished");

        if !status.success() {
            return Err(BenchDiffError::Process {
                command: command_line,
                exit_code,
                stderr,
            });
        }
        if let Some(e) = read_error {
            return Err(e.into());
        }

        Ok(ProcessOutput {
            stdout_lines,
            stderr,
            exit_code,
        })
    }
}
