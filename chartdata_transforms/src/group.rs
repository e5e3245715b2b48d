// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Group-by aggregation over records.
//!
//! Groups keep first-encounter order, which is the order most gallery charts want for their
//! category axis; call [`Grouped::sort_by_key`] or [`Grouped::sort_by_value_desc`] to re-sort.

extern crate alloc;

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::summary::{Moments, ScalarSummary, summarize_values};
use crate::transform::AggregateOp;

/// Aggregated values keyed by group, in first-encounter order.
#[derive(Debug, Clone)]
pub struct Grouped<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone, V> Default for Grouped<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq + Clone, V> Grouped<K, V> {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no groups.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Iterates over `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterates over values in order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Consumes the groups into `(key, value)` pairs in order.
    pub fn into_vec(self) -> Vec<(K, V)> {
        self.entries
    }

    /// Reorders groups with a comparator.
    pub fn sort_by(mut self, mut cmp: impl FnMut(&(K, V), &(K, V)) -> core::cmp::Ordering) -> Self {
        self.entries.sort_by(|a, b| cmp(a, b));
        self.reindex();
        self
    }

    /// Reorders groups by ascending key.
    pub fn sort_by_key(self) -> Self
    where
        K: Ord,
    {
        self.sort_by(|a, b| a.0.cmp(&b.0))
    }

    /// Maps every value, keeping keys and order.
    pub fn map_values<W>(self, mut f: impl FnMut(&K, V) -> W) -> Grouped<K, W> {
        Grouped {
            entries: self
                .entries
                .into_iter()
                .map(|(k, v)| {
                    let w = f(&k, v);
                    (k, w)
                })
                .collect(),
            index: self.index,
        }
    }

    pub(crate) fn slot(&mut self, key: K, init: impl FnOnce() -> V) -> &mut V {
        let i = match self.index.get(&key) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(key.clone(), i);
                self.entries.push((key, init()));
                i
            }
        };
        &mut self.entries[i].1
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, (k, _)) in self.entries.iter().enumerate() {
            self.index.insert(k.clone(), i);
        }
    }
}

impl<K: Hash + Eq + Clone> Grouped<K, f64> {
    /// Sum over all groups.
    pub fn total(&self) -> f64 {
        self.values().sum()
    }

    /// Each group's share of the total, as a fraction. Donut and pie legends use these.
    ///
    /// A zero total yields all zeros rather than `NaN`.
    pub fn shares(&self) -> Self {
        let total = self.total();
        self.clone()
            .map_values(|_, v| if total == 0.0 { 0.0 } else { v / total })
    }

    /// Reorders groups by descending value; ties keep their current order.
    pub fn sort_by_value_desc(self) -> Self {
        self.sort_by(|a, b| b.1.total_cmp(&a.1))
    }

    /// Keeps the `n` largest groups, in descending order.
    pub fn top_n(self, n: usize) -> Self {
        let mut out = self.sort_by_value_desc();
        out.entries.truncate(n);
        out.reindex();
        out
    }
}

/// Sums `value_fn` per key.
///
/// Records whose value is not finite are skipped; a key only appears once at least one of its
/// records contributed a finite value.
pub fn group<R, K: Hash + Eq + Clone>(
    records: &[R],
    key_fn: impl Fn(&R) -> K,
    value_fn: impl Fn(&R) -> f64,
) -> Grouped<K, f64> {
    let mut out = Grouped::default();
    let mut skipped = 0_usize;
    for r in records {
        let v = value_fn(r);
        if !v.is_finite() {
            skipped += 1;
            continue;
        }
        *out.slot(key_fn(r), || 0.0) += v;
    }
    tracing::debug!(groups = out.len(), skipped, "grouped records");
    out
}

/// Computes one accumulation per [`AggregateOp`] for each key.
///
/// The output values line up with `ops`. `Count` counts records with a finite value; the other
/// operations are taken over those same values.
pub fn group_aggregate<R, K: Hash + Eq + Clone>(
    records: &[R],
    key_fn: impl Fn(&R) -> Option<K>,
    value_fn: impl Fn(&R) -> f64,
    ops: &[AggregateOp],
) -> Grouped<K, Vec<f64>> {
    let mut moments: Grouped<K, Moments> = Grouped::default();
    for r in records {
        let v = value_fn(r);
        if !v.is_finite() {
            continue;
        }
        let Some(key) = key_fn(r) else {
            continue;
        };
        moments.slot(key, Moments::new).push(v);
    }
    moments.map_values(|_, m| ops.iter().map(|op| op.finish(&m)).collect())
}

/// Summarizes `value_fn` per key, as for box plots and per-category headline cards.
///
/// Groups without any finite value are omitted.
pub fn group_summaries<R, K: Hash + Eq + Clone>(
    records: &[R],
    key_fn: impl Fn(&R) -> K,
    value_fn: impl Fn(&R) -> f64,
    quartiles: bool,
) -> Grouped<K, ScalarSummary> {
    let mut values: Grouped<K, Vec<f64>> = Grouped::default();
    for r in records {
        let v = value_fn(r);
        if v.is_finite() {
            values.slot(key_fn(r), Vec::new).push(v);
        }
    }
    let mut out = Grouped::default();
    for (k, vs) in values.into_vec() {
        if let Ok(s) = summarize_values(vs, quartiles) {
            out.slot(k, || s);
        }
    }
    out
}

impl AggregateOp {
    pub(crate) fn finish(self, m: &Moments) -> f64 {
        match self {
            Self::Count => m.count as f64,
            Self::Sum => m.sum,
            Self::Min => m.min,
            Self::Max => m.max,
            Self::Mean => m.mean(),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use chartdata_core::{GroupKey, Record};

    use super::*;

    #[derive(Debug)]
    struct Cost {
        year: i32,
        cost: f64,
    }

    #[test]
    fn sums_per_year_in_first_encounter_order() {
        let rows = [
            Cost { year: 2005, cost: 10.0 },
            Cost { year: 2005, cost: 5.0 },
            Cost { year: 2006, cost: 3.0 },
        ];
        let g = group(&rows, |r| r.year, |r| r.cost);
        assert_eq!(g.into_vec(), vec![(2005, 15.0), (2006, 3.0)]);
    }

    #[test]
    fn empty_input_gives_no_groups() {
        let rows: [Cost; 0] = [];
        assert!(group(&rows, |r| r.year, |r| r.cost).is_empty());
    }

    #[test]
    fn non_finite_values_are_excluded_without_error() {
        let rows = [
            Cost { year: 1, cost: f64::NAN },
            Cost { year: 1, cost: 2.0 },
            Cost { year: 2, cost: f64::INFINITY },
        ];
        let g = group(&rows, |r| r.year, |r| r.cost);
        assert_eq!(g.get(&1), Some(&2.0));
        assert_eq!(g.get(&2), None);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn groups_records_by_text_key() {
        let rows = vec![
            Record::new().with("region", "West").with("sales", 4.0),
            Record::new().with("region", "East").with("sales", 1.0),
            Record::new().with("region", "West").with("sales", 2.0),
        ];
        let g = group(
            &rows,
            |r| r.key("region").unwrap_or_else(|| GroupKey::text("(none)")),
            |r| r.num("sales"),
        );
        assert_eq!(g.get(&GroupKey::text("West")), Some(&6.0));
        assert_eq!(g.keys().next(), Some(&GroupKey::text("West")));
    }

    #[test]
    fn shares_sum_to_one_and_handle_zero_total() {
        let rows = [("a", 1.0), ("b", 3.0)];
        let g = group(&rows, |r| r.0, |r| r.1);
        let shares: Vec<f64> = g.shares().values().copied().collect();
        assert_eq!(shares, vec![0.25, 0.75]);

        let zeros = [("a", 0.0), ("b", 0.0)];
        let g = group(&zeros, |r| r.0, |r| r.1);
        assert!(g.shares().values().all(|v| *v == 0.0));
    }

    #[test]
    fn sorting_keeps_lookup_consistent() {
        let rows = [("b", 1.0), ("c", 5.0), ("a", 3.0)];
        let g = group(&rows, |r| r.0, |r| r.1).sort_by_key();
        assert_eq!(g.keys().copied().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(g.get(&"c"), Some(&5.0));

        let top = group(&rows, |r| r.0, |r| r.1).top_n(2);
        assert_eq!(top.into_vec(), vec![("c", 5.0), ("a", 3.0)]);
    }

    #[test]
    fn aggregate_ops_line_up_with_request() {
        let rows = [("x", 2.0), ("x", 4.0), ("y", 1.0), ("y", f64::NAN)];
        let ops = [
            AggregateOp::Count,
            AggregateOp::Sum,
            AggregateOp::Min,
            AggregateOp::Max,
            AggregateOp::Mean,
        ];
        let g = group_aggregate(&rows, |r| Some(r.0), |r| r.1, &ops);
        assert_eq!(g.get(&"x"), Some(&vec![2.0, 6.0, 2.0, 4.0, 3.0]));
        assert_eq!(g.get(&"y"), Some(&vec![1.0, 1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn per_group_summaries_include_quartiles() {
        let rows = [
            ("Adelie", 3700.0),
            ("Adelie", 3800.0),
            ("Adelie", 3500.0),
            ("Gentoo", 5000.0),
            ("Chinstrap", f64::NAN),
        ];
        let g = group_summaries(&rows, |r| r.0, |r| r.1, true);
        assert_eq!(g.len(), 2);
        let adelie = g.get(&"Adelie").unwrap();
        assert_eq!(adelie.count, 3);
        assert_eq!(adelie.quartiles.unwrap().median, 3700.0);
        assert!(g.get(&"Chinstrap").is_none());
    }
}
