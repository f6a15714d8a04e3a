//! Core data types for benchmark results.
//!
//! A [`ResultSet`] maps a benchmark identity to its [`Measurement`] for a
//! single run. Identities are plain strings produced by
//! [`crate::collect::export`]; two records with equal identities in two runs
//! are the same benchmark.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Stable key matching one benchmark across runs.
pub type BenchmarkIdentity = String;

/// How benchmark identities are built from export records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingMode {
    /// `Type.Method(params)`.
    #[default]
    Short,
    /// The fully qualified name reported by the tool.
    Full,
}

impl NamingMode {
    #[must_use]
    pub const fn from_full_names(full_names: bool) -> Self {
        if full_names { Self::Full } else { Self::Short }
    }
}

/// One benchmark's outcome in a single run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Mean execution time in nanoseconds.
    pub mean_ns: f64,
    /// Bytes allocated per operation; `None` when memory diagnostics were off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_bytes: Option<i64>,
}

impl Measurement {
    #[must_use]
    pub const fn new(mean_ns: f64, allocated_bytes: Option<i64>) -> Self {
        Self {
            mean_ns,
            allocated_bytes,
        }
    }

    /// Time-only measurement.
    #[must_use]
    pub const fn time(mean_ns: f64) -> Self {
        Self::new(mean_ns, None)
    }
}

/// All measurements from one run, keyed by identity.
///
/// Inserting an identity that already exists replaces the earlier entry;
/// later invocations of the tool are authoritative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    entries: BTreeMap<BenchmarkIdentity, Measurement>,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a measurement, returning the one it replaced.
    pub fn insert(
        &mut self,
        identity: impl Into<BenchmarkIdentity>,
        measurement: Measurement,
    ) -> Option<Measurement> {
        self.entries.insert(identity.into(), measurement)
    }

    /// Merge `other` into `self`; entries from `other` win.
    pub fn merge(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }

    #[must_use]
    pub fn get(&self, identity: &str) -> Option<&Measurement> {
        self.entries.get(identity)
    }

    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in identity order.
    pub fn iter(&self) -> btree_map::Iter<'_, BenchmarkIdentity, Measurement> {
        self.entries.iter()
    }

    pub fn identities(&self) -> btree_map::Keys<'_, BenchmarkIdentity, Measurement> {
        self.entries.keys()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = (&'a BenchmarkIdentity, &'a Measurement);
    type IntoIter = btree_map::Iter<'a, BenchmarkIdentity, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<BenchmarkIdentity>> FromIterator<(K, Measurement)> for ResultSet {
    fn from_iter<I: IntoIterator<Item = (K, Measurement)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (identity, measurement) in iter {
            set.insert(identity, measurement);
        }
        set
    }
}
