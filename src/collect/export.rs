//! BenchmarkDotNet JSON export format.
//!
//! Only the fields the comparison needs are modeled; everything else in
//! the document is ignored. A missing `Memory` block means the run had no
//! memory diagnoser, which maps to "no allocation measurement" and never
//! to zero bytes.

use crate::error::{BenchDiffError, Result};
use crate::model::{BenchmarkIdentity, Measurement, NamingMode, ResultSet};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExportDocument {
    #[serde(default)]
    benchmarks: Vec<BenchmarkRecord>,
}

/// One benchmark entry of an export.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BenchmarkRecord {
    #[serde(rename = "Type")]
    pub type_name: String,
    pub method: String,
    #[serde(default)]
    pub parameters: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub statistics: Statistics,
    #[serde(default)]
    pub memory: Option<Memory>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statistics {
    pub mean: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Memory {
    #[serde(default)]
    pub bytes_allocated_per_operation: Option<i64>,
}

impl BenchmarkRecord {
    /// Identity of this record under `mode`.
    ///
    /// Depends only on the record itself, so the same benchmark gets the
    /// same key in every run.
    #[must_use]
    pub fn identity(&self, mode: NamingMode) -> BenchmarkIdentity {
        if mode == NamingMode::Full {
            if let Some(full) = self.full_name.as_deref().filter(|f| !f.trim().is_empty()) {
                return full.to_string();
            }
        }

        let mut id = format!("{}.{}", self.type_name, self.method);
        if let Some(params) = self.parameters.as_deref().filter(|p| !p.trim().is_empty()) {
            id.push('(');
            id.push_str(params);
            id.push(')');
        }
        id
    }

    #[must_use]
    pub fn measurement(&self) -> Measurement {
        Measurement::new(
            self.statistics.mean,
            self.memory
                .as_ref()
                .and_then(|m| m.bytes_allocated_per_operation),
        )
    }
}

/// Parse one export document.
///
/// # Errors
///
/// Returns `ExportParse` if `text` is not a valid export; `source` names
/// the document in the error.
pub fn parse_export(text: &str, source: &Path, mode: NamingMode) -> Result<ResultSet> {
    let doc: ExportDocument =
        serde_json::from_str(text).map_err(|e| BenchDiffError::ExportParse {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut results = ResultSet::new();
    for record in &doc.benchmarks {
        if !record.statistics.mean.is_finite() {
            return Err(BenchDiffError::ExportParse {
                path: source.to_path_buf(),
                reason: format!("non-finite mean for {}", record.identity(mode)),
            });
        }
        results.insert(record.identity(mode), record.measurement());
    }
    Ok(results)
}

/// Read and parse one export file.
///
/// # Errors
///
/// Returns `Io` if the file cannot be read, `ExportParse` if it is malformed.
pub fn read_export(path: &Path, mode: NamingMode) -> Result<ResultSet> {
    let text = fs::read_to_string(path)?;
    let results = parse_export(&text, path, mode)?;
    debug!(path = %path.display(), benchmarks = results.len(), "Parsed export");
    Ok(results)
}

/// Parse every `*.json` export under `dir`, merged in file-name order.
///
/// A missing directory yields an empty set.
///
/// # Errors
///
/// Returns the first read or parse failure.
pub fn read_exports_dir(dir: &Path, mode: NamingMode) -> Result<ResultSet> {
    let mut merged = ResultSet::new();
    if !dir.exists() {
        debug!(dir = %dir.display(), "No export directory");
        return Ok(merged);
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| anyhow::anyhow!("walking {}: {e}", dir.display()))?;
        let path = entry.path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if entry.file_type().is_file() && is_json {
            merged.merge(read_export(path, mode)?);
        }
    }
    Ok(merged)
}
