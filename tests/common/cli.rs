use assert_cmd::Command;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

#[derive(Debug)]
pub struct BdiffRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
    pub log_path: PathBuf,
}

impl BdiffRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// The structured error document printed on stderr.
    pub fn error_json(&self) -> serde_json::Value {
        let start = self.stderr.find('{').expect("JSON error on stderr");
        let end = self.stderr.rfind('}').expect("JSON error on stderr");
        serde_json::from_str(&self.stderr[start..=end]).expect("valid JSON error")
    }
}

/// Isolated home directory plus a place for command logs.
pub struct BdiffWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
    pub log_dir: PathBuf,
}

impl BdiffWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let home = root.join("home");
        let log_dir = root.join("logs");
        fs::create_dir_all(&home).expect("home dir");
        fs::create_dir_all(&log_dir).expect("log dir");
        Self {
            temp_dir,
            root,
            home,
            log_dir,
        }
    }
}

pub fn run_bdiff<I, S>(workspace: &BdiffWorkspace, cwd: &Path, args: I, label: &str) -> BdiffRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_bdiff_with_env(
        workspace,
        cwd,
        args,
        std::iter::empty::<(String, String)>(),
        label,
    )
}

pub fn run_bdiff_with_env<I, S, E, K, V>(
    workspace: &BdiffWorkspace,
    cwd: &Path,
    args: I,
    env_vars: E,
    label: &str,
) -> BdiffRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bdiff"));
    cmd.current_dir(cwd);
    cmd.args(&args);
    cmd.env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("BENCHDIFF_") {
            cmd.env_remove(key);
        }
    }
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_BACKTRACE", "1");
    cmd.env("HOME", &workspace.home);
    for (key, value) in super::fixtures::git_identity() {
        cmd.env(key, value);
    }

    let start = Instant::now();
    let output = cmd.output().expect("run bdiff");
    let duration = start.elapsed();

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    let log_path = workspace.log_dir.join(format!("{label}.log"));
    let log_body = format!(
        "label: {label}\nduration: {:?}\nstatus: {}\nargs: {:?}\ncwd: {}\n\nstdout:\n{}\n\nstderr:\n{}\n",
        duration,
        output.status,
        args,
        cwd.display(),
        stdout,
        stderr
    );
    fs::write(&log_path, log_body).expect("write log");

    BdiffRun {
        stdout,
        stderr,
        status: output.status,
        duration,
        log_path,
    }
}
