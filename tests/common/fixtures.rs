#![allow(dead_code)]

use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Committer identity for test repositories and the git calls bdiff makes.
pub fn git_identity() -> [(&'static str, &'static str); 4] {
    [
        ("GIT_AUTHOR_NAME", "Bench Test"),
        ("GIT_AUTHOR_EMAIL", "bench@example.com"),
        ("GIT_COMMITTER_NAME", "Bench Test"),
        ("GIT_COMMITTER_EMAIL", "bench@example.com"),
    ]
}

/// Run git in `repo`, panicking on failure; returns trimmed stdout.
pub fn git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo)
        .envs(git_identity())
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("HOME", repo)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Fresh repository whose initial branch is `main`.
pub fn init_repo(repo: &Path) {
    fs::create_dir_all(repo).expect("repo dir");
    git(repo, &["init", "-q"]);
    git(repo, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(repo, &["config", "commit.gpgsign", "false"]);
    git(repo, &["config", "user.name", "Bench Test"]);
    git(repo, &["config", "user.email", "bench@example.com"]);
}

pub fn commit_all(repo: &Path, message: &str) {
    git(repo, &["add", "-A"]);
    git(repo, &["commit", "-q", "-m", message]);
}

pub fn current_branch(repo: &Path) -> String {
    git(repo, &["symbolic-ref", "--short", "HEAD"])
}

pub fn stash_count(repo: &Path) -> usize {
    git(repo, &["stash", "list"]).lines().count()
}

/// One benchmark in an export document.
pub struct Bench {
    pub type_name: &'static str,
    pub method: &'static str,
    pub mean: f64,
    pub bytes: Option<i64>,
}

pub const fn bench(type_name: &'static str, method: &'static str, mean: f64) -> Bench {
    Bench {
        type_name,
        method,
        mean,
        bytes: None,
    }
}

pub const fn bench_alloc(
    type_name: &'static str,
    method: &'static str,
    mean: f64,
    bytes: i64,
) -> Bench {
    Bench {
        type_name,
        method,
        mean,
        bytes: Some(bytes),
    }
}

/// Export document in the benchmark tool's JSON format.
pub fn export_json(benches: &[Bench]) -> String {
    let records: Vec<_> = benches
        .iter()
        .map(|b| {
            let mut record = json!({
                "Namespace": "Perf",
                "Type": b.type_name,
                "Method": b.method,
                "Parameters": "",
                "FullName": format!("Perf.{}.{}", b.type_name, b.method),
                "Statistics": { "Mean": b.mean, "N": 15 },
            });
            if let Some(bytes) = b.bytes {
                record["Memory"] = json!({ "BytesAllocatedPerOperation": bytes });
            }
            record
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "Title": "fixture", "Benchmarks": records }))
        .expect("serialize export")
}

pub fn write_export(dir: &Path, file_name: &str, benches: &[Bench]) -> PathBuf {
    fs::create_dir_all(dir).expect("export dir");
    let path = dir.join(file_name);
    fs::write(&path, export_json(benches)).expect("write export");
    path
}

pub const BENCH_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="BenchmarkDotNet" Version="0.13.12" />
  </ItemGroup>
</Project>
"#;

/// Stand-in for the benchmark tool.
///
/// Copies `export.json` from its working directory (the project directory)
/// into `<artifacts>/results`, and fails when a `FAIL` file is present.
#[cfg(unix)]
pub fn write_fake_tool(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = r#"#!/bin/sh
artifacts=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--artifacts" ]; then
    artifacts="$2"
    shift
  fi
  shift
done
if [ -f FAIL ]; then
  echo "benchmark build failed" >&2
  exit 3
fi
echo "// Running benchmarks"
mkdir -p "$artifacts/results"
cp export.json "$artifacts/results/Bench-report-full.json"
echo "// Done"
"#;

    fs::create_dir_all(dir).expect("tool dir");
    let path = dir.join("fake-dotnet");
    fs::write(&path, script).expect("write tool");
    let mut perms = fs::metadata(&path).expect("tool metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod tool");
    path
}

/// Repository with one benchmark project, `main` holding the baseline
/// export and `topic` checked out with the head export as an uncommitted
/// change plus an untracked file.
pub struct BenchRepo {
    pub root: PathBuf,
    pub project_dir: PathBuf,
}

pub const HEAD_NOTES: &str = "scratch notes\n";

impl BenchRepo {
    pub fn create(root: &Path, baseline: &[Bench], head: &[Bench]) -> Self {
        init_repo(root);
        let project_dir = root.join("bench");
        fs::create_dir_all(&project_dir).expect("project dir");
        fs::write(project_dir.join("Bench.csproj"), BENCH_PROJECT).expect("csproj");
        write_export(&project_dir, "export.json", baseline);
        commit_all(root, "baseline");

        git(root, &["checkout", "-q", "-b", "topic"]);
        write_export(&project_dir, "export.json", head);
        fs::write(root.join("notes.txt"), HEAD_NOTES).expect("untracked file");

        Self {
            root: root.to_path_buf(),
            project_dir,
        }
    }

    pub fn head_export(&self) -> String {
        fs::read_to_string(self.project_dir.join("export.json")).expect("read export")
    }
}
