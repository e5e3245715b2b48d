// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar summaries: headline numbers, reference lines, box-plot quartiles and running totals.
//!
//! All quantiles in this crate use linear interpolation between closest ranks: for `n` sorted
//! values, probability `p` sits at position `p * (n - 1)` and is interpolated between the two
//! neighbouring values. This is the pandas/NumPy default (Hyndman & Fan type 7).

extern crate alloc;

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::bin::Bin;
use crate::error::{AggregateError, ConfigError};

/// Count, sum, mean and extent of one numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarSummary {
    /// Number of finite values.
    pub count: usize,
    /// Sum of finite values.
    pub sum: f64,
    /// `sum / count`.
    pub mean: f64,
    /// Smallest finite value.
    pub min: f64,
    /// Largest finite value.
    pub max: f64,
    /// Quartiles, when requested.
    pub quartiles: Option<Quartiles>,
}

/// First quartile, median and third quartile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    /// 25th percentile.
    pub q1: f64,
    /// 50th percentile.
    pub median: f64,
    /// 75th percentile.
    pub q3: f64,
}

impl Quartiles {
    /// `q3 - q1`.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Streaming count/sum/min/max over finite values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Moments {
    pub(crate) count: usize,
    pub(crate) sum: f64,
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl Moments {
    pub(crate) fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Adds `v` if it is finite. Returns whether it was counted.
    pub(crate) fn push(&mut self, v: f64) -> bool {
        if !v.is_finite() {
            return false;
        }
        self.count += 1;
        self.sum += v;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        true
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }

    fn finish(&self, quartiles: Option<Quartiles>) -> Result<ScalarSummary, AggregateError> {
        if self.count == 0 {
            return Err(AggregateError::EmptyDataset);
        }
        Ok(ScalarSummary {
            count: self.count,
            sum: self.sum,
            mean: self.mean(),
            min: self.min,
            max: self.max,
            quartiles,
        })
    }
}

/// Summarizes `field` over all records with a finite value.
///
/// Fails with [`AggregateError::EmptyDataset`] if no record has a finite value.
pub fn summarize<R>(
    records: &[R],
    field: impl Fn(&R) -> f64,
) -> Result<ScalarSummary, AggregateError> {
    let mut m = Moments::new();
    for r in records {
        m.push(field(r));
    }
    let out = m.finish(None)?;
    tracing::debug!(
        count = out.count,
        skipped = records.len() - out.count,
        "summarized field"
    );
    Ok(out)
}

/// Like [`summarize`], and also computes [`Quartiles`].
pub fn summarize_with_quartiles<R>(
    records: &[R],
    field: impl Fn(&R) -> f64,
) -> Result<ScalarSummary, AggregateError> {
    summarize_values(records.iter().map(field), true)
}

/// Summarizes a stream of values, skipping non-finite ones.
pub fn summarize_values(
    values: impl IntoIterator<Item = f64>,
    quartiles: bool,
) -> Result<ScalarSummary, AggregateError> {
    let mut m = Moments::new();
    let mut kept = Vec::new();
    for v in values {
        if m.push(v) && quartiles {
            kept.push(v);
        }
    }
    if m.count == 0 {
        return Err(AggregateError::EmptyDataset);
    }
    let q = if quartiles {
        kept.sort_unstable_by(f64::total_cmp);
        Some(Quartiles {
            q1: quantile_sorted(&kept, 0.25),
            median: quantile_sorted(&kept, 0.5),
            q3: quantile_sorted(&kept, 0.75),
        })
    } else {
        None
    };
    m.finish(q)
}

/// Returns the `p`-quantile of the finite values in `values`.
///
/// Fails with `InvalidConfiguration` if `p` is outside `[0, 1]`, and with `EmptyDataset` if there
/// are no finite values.
pub fn quantile(values: &[f64], p: f64) -> Result<f64, AggregateError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::Quantile(p).into());
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(AggregateError::EmptyDataset);
    }
    sorted.sort_unstable_by(f64::total_cmp);
    Ok(quantile_sorted(&sorted, p))
}

/// `sorted` must be non-empty and ascending.
pub(crate) fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let last = sorted.len() - 1;
    let pos = p * last as f64;
    let lo_f = pos.floor();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "pos is within [0, len - 1]"
    )]
    let lo = lo_f as usize;
    let hi = (lo + 1).min(last);
    let frac = pos - lo_f;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Running total of bin counts.
///
/// `bins` must be ordered by ascending `start`, as produced by the binning functions.
pub fn cumulative_sum(bins: &[Bin]) -> Vec<f64> {
    debug_assert!(
        bins.windows(2).all(|w| w[0].start < w[1].start),
        "cumulative_sum requires bins in ascending order"
    );
    running_total(bins.iter().map(|b| b.count as f64))
}

/// Running total of bin counts as fractions of the overall total.
///
/// An all-zero histogram yields all zeros.
pub fn cumulative_share(bins: &[Bin]) -> Vec<f64> {
    let mut out = cumulative_sum(bins);
    let total = out.last().copied().unwrap_or(0.0);
    for v in &mut out {
        *v = if total > 0.0 { *v / total } else { 0.0 };
    }
    out
}

/// Prefix sum over `values`. Non-finite values contribute nothing.
pub fn running_total(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut acc = 0.0;
    values
        .into_iter()
        .map(|v| {
            if v.is_finite() {
                acc += v;
            }
            acc
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn summarize_four_ratings() {
        let rows = [1.0, 2.0, 3.0, 4.0];
        let s = summarize(&rows, |r| *r).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.sum, 10.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
        assert!(s.quartiles.is_none());
    }

    #[test]
    fn summarize_empty_is_an_error() {
        let rows: [f64; 0] = [];
        assert_eq!(summarize(&rows, |r| *r), Err(AggregateError::EmptyDataset));
    }

    #[test]
    fn summarize_all_non_finite_is_an_error() {
        let rows = [f64::NAN, f64::INFINITY];
        assert_eq!(summarize(&rows, |r| *r), Err(AggregateError::EmptyDataset));
    }

    #[test]
    fn summarize_skips_non_finite_values() {
        let rows = [1.0, f64::NAN, 3.0, f64::NEG_INFINITY];
        let s = summarize(&rows, |r| *r).unwrap();
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 2.0);
    }

    #[test]
    fn summarize_is_deterministic() {
        let rows = [3.5, 1.25, 9.0, 2.0, 7.75];
        let a = summarize_with_quartiles(&rows, |r| *r).unwrap();
        let b = summarize_with_quartiles(&rows, |r| *r).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn quartiles_interpolate_linearly_between_ranks() {
        let rows = [1.0, 2.0, 3.0, 4.0];
        let q = summarize_with_quartiles(&rows, |r| *r)
            .unwrap()
            .quartiles
            .unwrap();
        assert_eq!(q.q1, 1.75);
        assert_eq!(q.median, 2.5);
        assert_eq!(q.q3, 3.25);
        assert_eq!(q.iqr(), 1.5);
    }

    #[test]
    fn quartiles_of_a_single_value() {
        let q = summarize_values([5.0], true).unwrap().quartiles.unwrap();
        assert_eq!((q.q1, q.median, q.q3), (5.0, 5.0, 5.0));
    }

    #[test]
    fn quantile_rejects_out_of_range_probability() {
        assert_eq!(
            quantile(&[1.0, 2.0], 1.5),
            Err(AggregateError::InvalidConfiguration(ConfigError::Quantile(1.5)))
        );
        assert_eq!(quantile(&[f64::NAN], 0.5), Err(AggregateError::EmptyDataset));
        assert_eq!(quantile(&[10.0, 0.0, 20.0], 1.0), Ok(20.0));
        assert_eq!(quantile(&[10.0, 0.0, 20.0], 0.0), Ok(0.0));
    }

    #[test]
    fn cumulative_sum_and_share_over_bins() {
        let bins = vec![
            Bin {
                start: 0.0,
                end: 1.0,
                count: 2,
            },
            Bin {
                start: 1.0,
                end: 2.0,
                count: 0,
            },
            Bin {
                start: 2.0,
                end: 3.0,
                count: 6,
            },
        ];
        assert_eq!(cumulative_sum(&bins), vec![2.0, 2.0, 8.0]);
        assert_eq!(cumulative_share(&bins), vec![0.25, 0.25, 1.0]);
        assert!(cumulative_sum(&[]).is_empty());
    }

    #[test]
    fn running_total_ignores_non_finite() {
        assert_eq!(running_total([1.0, f64::NAN, 2.0]), vec![1.0, 1.0, 3.0]);
    }
}
