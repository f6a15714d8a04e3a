//! Benchmark project discovery.
//!
//! Walks a directory tree for `.csproj` files and keeps the ones that
//! reference the BenchmarkDotNet package. Unreadable or malformed project
//! files are reported as warnings and skipped.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Package whose presence marks a benchmark project.
pub const BENCHMARK_PACKAGE: &str = "BenchmarkDotNet";

const PROJECT_EXTENSION: &str = "csproj";

/// Directories never searched for projects.
const SKIPPED_DIRS: &[&str] = &["bin", "obj", ".git", "node_modules"];

/// A project file that could not be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    pub path: PathBuf,
    pub reason: String,
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.reason)
    }
}

/// Result of a discovery walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Qualifying project files, in path order.
    pub projects: Vec<PathBuf>,
    pub warnings: Vec<DiscoveryWarning>,
}

/// Find benchmark projects under `root`.
#[must_use]
pub fn discover_projects(root: &Path) -> Discovery {
    let mut discovery = Discovery::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                record_warning(&mut discovery, path, e.to_string());
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !has_project_extension(path) {
            continue;
        }

        match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| references_package(&text, BENCHMARK_PACKAGE))
        {
            Ok(true) => {
                debug!(project = %path.display(), "Found benchmark project");
                discovery.projects.push(path.to_path_buf());
            }
            Ok(false) => debug!(project = %path.display(), "Not a benchmark project"),
            Err(reason) => record_warning(&mut discovery, path.to_path_buf(), reason),
        }
    }

    discovery
}

fn record_warning(discovery: &mut Discovery, path: PathBuf, reason: String) {
    let warning = DiscoveryWarning { path, reason };
    warn!(%warning, "Skipping unreadable project");
    discovery.warnings.push(warning);
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn has_project_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_EXTENSION))
}

/// Whether a project document declares a `PackageReference` to `package`.
///
/// The match is exact on the name, ignoring ASCII case.
///
/// # Errors
///
/// Returns the XML parse error message if `text` is not well-formed.
pub fn references_package(text: &str, package: &str) -> Result<bool, String> {
    let doc = roxmltree::Document::parse(text).map_err(|e| e.to_string())?;
    Ok(doc
        .descendants()
        .filter(|node| node.has_tag_name("PackageReference"))
        .filter_map(|node| node.attribute("Include").or_else(|| node.attribute("Update")))
        .any(|name| name.trim().eq_ignore_ascii_case(package)))
}
