//! Matching and classification of two result sets.
//!
//! [`diff`] is a pure function: it reads a baseline and a head
//! [`ResultSet`] and produces a [`DiffReport`] whose lists are already in
//! display order.

use crate::model::{BenchmarkIdentity, Measurement, ResultSet};
use serde::Serialize;
use std::cmp::Ordering;

/// Default minimum absolute percent change worth reporting.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 1.0;

/// A benchmark present in both runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRecord {
    pub identity: BenchmarkIdentity,
    pub baseline: Measurement,
    pub head: Measurement,
}

impl DiffRecord {
    /// Head mean over baseline mean; below 1.0 is an improvement.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        ratio(self.baseline.mean_ns, self.head.mean_ns)
    }

    /// Relative change of the mean, in percent.
    #[must_use]
    pub fn percent_change(&self) -> f64 {
        let (base, head) = (self.baseline.mean_ns, self.head.mean_ns);
        if base == 0.0 {
            return if head == 0.0 { 0.0 } else { f64::INFINITY };
        }
        (head - base) / base * 100.0
    }

    /// Head bytes minus baseline bytes, when both runs measured allocation.
    #[must_use]
    pub fn allocation_delta(&self) -> Option<i64> {
        match (self.baseline.allocated_bytes, self.head.allocated_bytes) {
            (Some(base), Some(head)) => Some(head.saturating_sub(base)),
            _ => None,
        }
    }
}

/// A benchmark present in only one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleRecord {
    pub identity: BenchmarkIdentity,
    pub measurement: Measurement,
}

/// Classified comparison of two runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffReport {
    /// Ratio below 1.0, most improved first.
    pub faster: Vec<DiffRecord>,
    /// Ratio of 1.0 or above, most regressed first.
    pub slower: Vec<DiffRecord>,
    /// Allocation went down; ordered like `faster`.
    pub less_allocation: Vec<DiffRecord>,
    /// Allocation went up; ordered like `slower`.
    pub more_allocation: Vec<DiffRecord>,
    pub only_in_head: Vec<SingleRecord>,
    pub only_in_baseline: Vec<SingleRecord>,
    /// Common benchmarks whose change stayed under the threshold.
    pub below_threshold: usize,
    /// Common benchmarks with allocation data on both sides and no change.
    pub identical_allocation: usize,
    pub threshold_percent: f64,
}

impl DiffReport {
    /// Number of benchmarks present in both runs.
    #[must_use]
    pub fn common_count(&self) -> usize {
        self.faster.len() + self.slower.len() + self.below_threshold
    }
}

/// Compare `head` against `baseline`.
///
/// Time and allocation are classified independently: a benchmark whose
/// time change is below the threshold can still appear in an allocation
/// list.
#[must_use]
pub fn diff(baseline: &ResultSet, head: &ResultSet, threshold_percent: f64) -> DiffReport {
    let mut report = DiffReport {
        threshold_percent,
        ..DiffReport::default()
    };

    for (identity, head_m) in head {
        let Some(base_m) = baseline.get(identity) else {
            report.only_in_head.push(SingleRecord {
                identity: identity.clone(),
                measurement: *head_m,
            });
            continue;
        };

        let record = DiffRecord {
            identity: identity.clone(),
            baseline: *base_m,
            head: *head_m,
        };

        match record.allocation_delta() {
            Some(0) => report.identical_allocation += 1,
            Some(delta) if delta < 0 => report.less_allocation.push(record.clone()),
            Some(_) => report.more_allocation.push(record.clone()),
            None => {}
        }

        if record.percent_change().abs() < threshold_percent {
            report.below_threshold += 1;
        } else if record.ratio() < 1.0 {
            report.faster.push(record);
        } else {
            report.slower.push(record);
        }
    }

    for (identity, base_m) in baseline {
        if !head.contains(identity) {
            report.only_in_baseline.push(SingleRecord {
                identity: identity.clone(),
                measurement: *base_m,
            });
        }
    }

    sort_ascending(&mut report.faster);
    sort_descending(&mut report.slower);
    sort_ascending(&mut report.less_allocation);
    sort_descending(&mut report.more_allocation);
    report
}

/// `head / baseline` with the degenerate zero-baseline cases pinned down.
fn ratio(baseline: f64, head: f64) -> f64 {
    if baseline == 0.0 {
        if head == 0.0 { 1.0 } else { f64::INFINITY }
    } else {
        head / baseline
    }
}

fn by_ratio(a: &DiffRecord, b: &DiffRecord) -> Ordering {
    a.ratio()
        .total_cmp(&b.ratio())
        .then_with(|| a.identity.cmp(&b.identity))
}

fn sort_ascending(records: &mut [DiffRecord]) {
    records.sort_by(by_ratio);
}

fn sort_descending(records: &mut [DiffRecord]) {
    records.sort_by(|a, b| {
        b.ratio()
            .total_cmp(&a.ratio())
            .then_with(|| a.identity.cmp(&b.identity))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn set(entries: &[(&str, f64)]) -> ResultSet {
        entries
            .iter()
            .map(|(id, mean)| (*id, Measurement::time(*mean)))
            .collect()
    }

    fn alloc_set(entries: &[(&str, f64, i64)]) -> ResultSet {
        entries
            .iter()
            .map(|(id, mean, bytes)| (*id, Measurement::new(*mean, Some(*bytes))))
            .collect()
    }

    fn ids(records: &[DiffRecord]) -> Vec<&str> {
        records.iter().map(|r| r.identity.as_str()).collect()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let head = set(&[("A", 10.0), ("B", 100.0)]);
        let baseline = set(&[("A", 20.0), ("C", 50.0)]);

        let report = diff(&baseline, &head, 1.0);
        assert_eq!(ids(&report.faster), vec!["A"]);
        assert!((report.faster[0].ratio() - 0.5).abs() < f64::EPSILON);
        assert!(report.slower.is_empty());
        assert_eq!(report.only_in_head.len(), 1);
        assert_eq!(report.only_in_head[0].identity, "B");
        assert_eq!(report.only_in_baseline.len(), 1);
        assert_eq!(report.only_in_baseline[0].identity, "C");
        assert_eq!(report.below_threshold, 0);
    }

    #[test]
    fn test_large_improvement_ratio() {
        let report = diff(&set(&[("P", 290.79)]), &set(&[("P", 11.20)]), 1.0);
        let ratio = report.faster[0].ratio();
        assert!((ratio - 11.20 / 290.79).abs() < 1e-12);
        assert_eq!(format!("{ratio:.2}"), "0.04");
    }

    #[test]
    fn test_regression_ratio() {
        let report = diff(&set(&[("P", 39.80)]), &set(&[("P", 60.04)]), 1.0);
        assert!(report.faster.is_empty());
        let record = &report.slower[0];
        assert!((record.percent_change() - 50.854_271).abs() < 1e-3);
        assert_eq!(format!("{:.2}", record.ratio()), "1.51");
    }

    #[test]
    fn test_change_under_threshold_is_counted_not_listed() {
        let report = diff(&set(&[("P", 100.0)]), &set(&[("P", 100.5)]), 1.0);
        assert!(report.faster.is_empty());
        assert!(report.slower.is_empty());
        assert_eq!(report.below_threshold, 1);
    }

    #[test]
    fn test_unchanged_with_zero_threshold_is_slower() {
        // Ratio exactly 1.0 sits on the slower side of the boundary.
        let report = diff(&set(&[("P", 42.0)]), &set(&[("P", 42.0)]), 0.0);
        assert!(report.faster.is_empty());
        assert_eq!(ids(&report.slower), vec!["P"]);
        assert_eq!(report.below_threshold, 0);
    }

    #[test]
    fn test_change_exactly_at_threshold_is_reported() {
        let report = diff(&set(&[("P", 100.0)]), &set(&[("P", 102.0)]), 2.0);
        assert_eq!(ids(&report.slower), vec!["P"]);
    }

    #[test]
    fn test_ordering_most_significant_first() {
        let baseline = set(&[("a", 100.0), ("b", 100.0), ("c", 100.0), ("d", 100.0)]);
        let head = set(&[("a", 90.0), ("b", 50.0), ("c", 110.0), ("d", 300.0)]);
        let report = diff(&baseline, &head, 1.0);
        assert_eq!(ids(&report.faster), vec!["b", "a"]);
        assert_eq!(ids(&report.slower), vec!["d", "c"]);
    }

    #[test]
    fn test_allocation_partition_and_identical_count() {
        let baseline = alloc_set(&[("a", 100.0, 64), ("b", 100.0, 64), ("c", 100.0, 64)]);
        let head = alloc_set(&[("a", 50.0, 32), ("b", 100.2, 128), ("c", 200.0, 64)]);
        let report = diff(&baseline, &head, 1.0);

        assert_eq!(ids(&report.less_allocation), vec!["a"]);
        assert_eq!(report.less_allocation[0].allocation_delta(), Some(-32));
        // Below the time threshold but still an allocation change.
        assert_eq!(ids(&report.more_allocation), vec!["b"]);
        assert_eq!(report.identical_allocation, 1);
    }

    #[test]
    fn test_allocation_lists_follow_time_ratio_order() {
        let baseline = alloc_set(&[("x", 100.0, 10), ("y", 100.0, 10)]);
        let head = alloc_set(&[("x", 300.0, 11), ("y", 150.0, 5000)]);
        let report = diff(&baseline, &head, 1.0);
        // x regressed more in time, so it leads despite the smaller byte delta.
        assert_eq!(ids(&report.more_allocation), vec!["x", "y"]);
    }

    #[test]
    fn test_missing_allocation_on_one_side_is_skipped() {
        let baseline = set(&[("a", 100.0)]);
        let head = alloc_set(&[("a", 50.0, 32)]);
        let report = diff(&baseline, &head, 1.0);
        assert!(report.less_allocation.is_empty());
        assert!(report.more_allocation.is_empty());
        assert_eq!(report.identical_allocation, 0);
        assert_eq!(report.faster[0].allocation_delta(), None);
    }

    #[test]
    fn test_zero_baseline_mean() {
        let report = diff(&set(&[("z", 0.0), ("n", 0.0)]), &set(&[("z", 0.0), ("n", 5.0)]), 1.0);
        assert_eq!(report.below_threshold, 1);
        assert_eq!(ids(&report.slower), vec!["n"]);
        assert!(report.slower[0].ratio().is_infinite());
    }

    #[test]
    fn test_empty_inputs() {
        let report = diff(&ResultSet::new(), &ResultSet::new(), 1.0);
        assert_eq!(report, DiffReport {
            threshold_percent: 1.0,
            ..DiffReport::default()
        });
    }

    fn result_set() -> impl Strategy<Value = ResultSet> {
        prop::collection::btree_map("[a-f]{1,2}", 1.0f64..10_000.0, 0..12)
            .prop_map(|m| m.into_iter().map(|(k, v)| (k, Measurement::time(v))).collect())
    }

    proptest! {
        #[test]
        fn prop_listed_identities_come_from_the_right_side(
            a in result_set(),
            b in result_set(),
            t in 0.0f64..50.0,
        ) {
            let report = diff(&a, &b, t);
            for r in report.faster.iter().chain(&report.slower) {
                prop_assert!(a.contains(&r.identity) && b.contains(&r.identity));
            }
            for r in &report.only_in_head {
                prop_assert!(b.contains(&r.identity) && !a.contains(&r.identity));
            }
            for r in &report.only_in_baseline {
                prop_assert!(a.contains(&r.identity) && !b.contains(&r.identity));
            }
        }

        #[test]
        fn prop_common_identities_are_partitioned(
            a in result_set(),
            b in result_set(),
            t in 0.0f64..50.0,
        ) {
            let report = diff(&a, &b, t);
            let common: BTreeSet<_> = a.identities().filter(|id| b.contains(id)).collect();
            prop_assert_eq!(report.common_count(), common.len());
        }

        #[test]
        fn prop_lists_are_ordered_by_ratio(a in result_set(), b in result_set()) {
            let report = diff(&a, &b, 1.0);
            for w in report.faster.windows(2) {
                prop_assert!(w[0].ratio() <= w[1].ratio());
            }
            for w in report.slower.windows(2) {
                prop_assert!(w[0].ratio() >= w[1].ratio());
            }
        }

        #[test]
        fn prop_self_comparison_is_all_below_threshold(a in result_set(), t in 0.001f64..50.0) {
            let report = diff(&a, &a, t);
            prop_assert!(report.faster.is_empty());
            prop_assert!(report.slower.is_empty());
            prop_assert_eq!(report.below_threshold, a.len());
        }
    }
}
