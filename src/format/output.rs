//! JSON output types.
//!
//! Flattened views of the diff types with the derived numbers (ratio,
//! percent change, allocation delta) materialized, so consumers of
//! `--json` never have to recompute them.

use crate::diff::{DiffRecord, DiffReport, SingleRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A benchmark present in both runs.
#[derive(Debug, Clone, Serialize)]
pub struct ComparedBenchmark {
    pub identity: String,
    pub baseline_mean_ns: f64,
    pub head_mean_ns: f64,
    /// `null` when the baseline mean is zero and the head mean is not.
    pub ratio: Option<f64>,
    pub percent_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_allocated_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_allocated_bytes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_delta: Option<i64>,
}

impl From<&DiffRecord> for ComparedBenchmark {
    fn from(r: &DiffRecord) -> Self {
        let finite = |v: f64| v.is_finite().then_some(v);
        Self {
            identity: r.identity.clone(),
            baseline_mean_ns: r.baseline.mean_ns,
            head_mean_ns: r.head.mean_ns,
            ratio: finite(r.ratio()),
            percent_change: finite(r.percent_change()),
            baseline_allocated_bytes: r.baseline.allocated_bytes,
            head_allocated_bytes: r.head.allocated_bytes,
            allocation_delta: r.allocation_delta(),
        }
    }
}

/// A benchmark present in only one run.
#[derive(Debug, Clone, Serialize)]
pub struct SingleBenchmark {
    pub identity: String,
    pub mean_ns: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_bytes: Option<i64>,
}

impl From<&SingleRecord> for SingleBenchmark {
    fn from(r: &SingleRecord) -> Self {
        Self {
            identity: r.identity.clone(),
            mean_ns: r.measurement.mean_ns,
            allocated_bytes: r.measurement.allocated_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub faster: usize,
    pub slower: usize,
    pub below_threshold: usize,
    pub identical_allocation: usize,
    pub only_in_head: usize,
    pub only_in_baseline: usize,
}

fn compared(records: &[DiffRecord]) -> Vec<ComparedBenchmark> {
    records.iter().map(ComparedBenchmark::from).collect()
}

fn single(records: &[SingleRecord]) -> Vec<SingleBenchmark> {
    records.iter().map(SingleBenchmark::from).collect()
}

/// Document printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub generated_at: DateTime<Utc>,
    /// Revision the baseline was measured on; absent for `compare`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_revision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_revision: Option<String>,
    pub threshold_percent: f64,
    pub faster: Vec<ComparedBenchmark>,
    pub slower: Vec<ComparedBenchmark>,
    pub less_allocation: Vec<ComparedBenchmark>,
    pub more_allocation: Vec<ComparedBenchmark>,
    pub only_in_head: Vec<SingleBenchmark>,
    pub only_in_baseline: Vec<SingleBenchmark>,
    pub summary: ReportSummary,
}

impl ReportOutput {
    #[must_use]
    pub fn new(report: &DiffReport) -> Self {
        Self {
            generated_at: Utc::now(),
            baseline_revision: None,
            head_revision: None,
            threshold_percent: report.threshold_percent,
            faster: compared(&report.faster),
            slower: compared(&report.slower),
            less_allocation: compared(&report.less_allocation),
            more_allocation: compared(&report.more_allocation),
            only_in_head: single(&report.only_in_head),
            only_in_baseline: single(&report.only_in_baseline),
            summary: ReportSummary {
                faster: report.faster.len(),
                slower: report.slower.len(),
                below_threshold: report.below_threshold,
                identical_allocation: report.identical_allocation,
                only_in_head: report.only_in_head.len(),
                only_in_baseline: report.only_in_baseline.len(),
            },
        }
    }

    #[must_use]
    pub fn with_revisions(mut self, baseline: impl Into<String>, head: impl Into<String>) -> Self {
        self.baseline_revision = Some(baseline.into());
        self.head_revision = Some(head.into());
        self
    }
}
