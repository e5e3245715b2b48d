// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gaussian kernel density estimates.
//!
//! Density and violin charts draw a smoothed distribution instead of a histogram. The estimate at
//! a tick `x` is the mean of `K((x - v) / h) / h` over the finite values `v`, where `K` is the
//! standard normal kernel and `h` the bandwidth, so each curve integrates to 1.

extern crate alloc;

use alloc::vec::Vec;
use core::f64::consts::PI;
use core::hash::Hash;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::bin::MAX_BINS;
use crate::error::{AggregateError, ConfigError};
use crate::group::Grouped;
use crate::summary::quantile_sorted;

/// Standard normal kernel.
fn gaussian(u: f64) -> f64 {
    (-0.5 * u * u).exp() / (2.0 * PI).sqrt()
}

fn check_bandwidth(bandwidth: f64) -> Result<(), AggregateError> {
    if bandwidth.is_finite() && bandwidth > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Bandwidth(bandwidth).into())
    }
}

/// Evenly spaced evaluation points `start, start + step, ...` up to and including `stop`.
///
/// Fails like a stepped bin grid: a non-positive step, an empty domain, or more than
/// [`MAX_BINS`] points are `InvalidConfiguration`.
pub fn density_ticks(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, AggregateError> {
    if !(start.is_finite() && stop.is_finite() && stop >= start && (stop - start).is_finite()) {
        return Err(ConfigError::Domain {
            min: start,
            max: stop,
        }
        .into());
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(ConfigError::Step(step).into());
    }
    // Tolerate float noise when the span is a whole multiple of the step.
    let n_f = ((stop - start) / step + 1e-9).floor();
    if n_f >= MAX_BINS as f64 {
        return Err(ConfigError::TooManyBins(n_f + 1.0).into());
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "non-negative and below MAX_BINS"
    )]
    let n = n_f as usize;
    Ok((0..=n).map(|i| start + step * i as f64).collect())
}

/// Estimates the density of `values` at each tick with a Gaussian kernel of width `bandwidth`.
///
/// Returns `(tick, density)` pairs in tick order. Non-finite values are skipped; if none remain
/// the result is `EmptyDataset`. A bandwidth that is not positive and finite is
/// `InvalidConfiguration`.
pub fn kde(
    values: impl IntoIterator<Item = f64>,
    bandwidth: f64,
    ticks: &[f64],
) -> Result<Vec<(f64, f64)>, AggregateError> {
    check_bandwidth(bandwidth)?;
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Err(AggregateError::EmptyDataset);
    }
    let norm = values.len() as f64 * bandwidth;
    let out = ticks
        .iter()
        .map(|&x| {
            let sum: f64 = values.iter().map(|&v| gaussian((x - v) / bandwidth)).sum();
            (x, sum / norm)
        })
        .collect();
    tracing::debug!(
        values = values.len(),
        ticks = ticks.len(),
        bandwidth,
        "estimated density"
    );
    Ok(out)
}

/// Silverman's rule of thumb, `0.9 * min(sd, iqr / 1.34) * n^(-1/5)`, over the finite values.
///
/// When the interquartile range is zero the standard deviation is used alone. Values with no
/// spread at all cannot pick a bandwidth and yield `InvalidConfiguration`.
pub fn silverman_bandwidth(values: impl IntoIterator<Item = f64>) -> Result<f64, AggregateError> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(AggregateError::EmptyDataset);
    }
    sorted.sort_unstable_by(f64::total_cmp);
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let sd = if sorted.len() > 1 {
        let ss: f64 = sorted.iter().map(|v| (v - mean) * (v - mean)).sum();
        (ss / (n - 1.0)).sqrt()
    } else {
        0.0
    };
    let iqr = quantile_sorted(&sorted, 0.75) - quantile_sorted(&sorted, 0.25);
    let spread = if iqr > 0.0 { sd.min(iqr / 1.34) } else { sd };
    let bandwidth = 0.9 * spread * n.powf(-0.2);
    check_bandwidth(bandwidth)?;
    Ok(bandwidth)
}

/// One density curve per key, all evaluated at the same ticks, for overlaid density charts.
///
/// Keys keep first-encounter order. Groups without a finite value are omitted, and empty input
/// yields no groups. The bandwidth is checked even when there is nothing to estimate.
pub fn group_kde<R, K: Hash + Eq + Clone>(
    records: &[R],
    key_fn: impl Fn(&R) -> K,
    value_fn: impl Fn(&R) -> f64,
    bandwidth: f64,
    ticks: &[f64],
) -> Result<Grouped<K, Vec<(f64, f64)>>, AggregateError> {
    check_bandwidth(bandwidth)?;
    let mut values: Grouped<K, Vec<f64>> = Grouped::default();
    for r in records {
        let v = value_fn(r);
        if v.is_finite() {
            values.slot(key_fn(r), Vec::new).push(v);
        }
    }
    let mut out = Grouped::default();
    for (k, vs) in values.into_vec() {
        let curve = kde(vs, bandwidth, ticks)?;
        out.slot(k, || curve);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn single_value_peaks_at_the_normal_density() {
        let curve = kde([0.0], 1.0, &[0.0, 1.0, -1.0]).unwrap();
        assert!(close(curve[0].1, 0.398_942_280_401_432_7));
        assert!(close(curve[1].1, 0.241_970_724_519_143_37));
        assert!(close(curve[1].1, curve[2].1));
        assert_eq!(curve[2].0, -1.0);
    }

    #[test]
    fn density_is_the_mean_of_scaled_kernels() {
        // Midway between two values, each contributes K(1) / h with h = 1.
        let curve = kde([0.0, 2.0], 1.0, &[1.0]).unwrap();
        assert!(close(curve[0].1, 0.241_970_724_519_143_37));
        // Doubling the bandwidth halves the peak of a single value.
        let wide = kde([0.0], 2.0, &[0.0]).unwrap();
        assert!(close(wide[0].1, 0.398_942_280_401_432_7 / 2.0));
    }

    #[test]
    fn curve_integrates_to_one() {
        let ticks = density_ticks(-20.0, 30.0, 0.05).unwrap();
        let curve = kde([1.0, 4.0, 4.5, 9.0], 1.5, &ticks).unwrap();
        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) * 0.5)
            .sum();
        assert!((area - 1.0).abs() < 1e-6, "area {area}");
    }

    #[test]
    fn non_finite_values_are_skipped() {
        let clean = kde([3.0, 5.0], 1.0, &[4.0]).unwrap();
        let noisy = kde([3.0, f64::NAN, 5.0, f64::INFINITY], 1.0, &[4.0]).unwrap();
        assert_eq!(clean, noisy);
    }

    #[test]
    fn invalid_bandwidth_and_empty_input_are_reported() {
        for h in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                kde([1.0], h, &[0.0]),
                Err(AggregateError::InvalidConfiguration(ConfigError::Bandwidth(_)))
            ));
        }
        assert_eq!(
            kde([f64::NAN], 1.0, &[0.0]),
            Err(AggregateError::EmptyDataset)
        );
        assert_eq!(
            kde(core::iter::empty::<f64>(), 1.0, &[0.0]),
            Err(AggregateError::EmptyDataset)
        );
    }

    #[test]
    fn ticks_include_both_ends() {
        let ticks = density_ticks(2500.0, 6500.0, 50.0).unwrap();
        assert_eq!(ticks.len(), 81);
        assert_eq!(ticks[0], 2500.0);
        assert_eq!(ticks[80], 6500.0);
        assert_eq!(density_ticks(0.0, 1.0, 0.3).unwrap().len(), 4);
        assert_eq!(density_ticks(1.0, 1.0, 0.5).unwrap(), vec![1.0]);
        assert!(matches!(
            density_ticks(0.0, 1.0, 0.0),
            Err(AggregateError::InvalidConfiguration(ConfigError::Step(_)))
        ));
        assert!(matches!(
            density_ticks(0.0, 1.0, 1e-9),
            Err(AggregateError::InvalidConfiguration(ConfigError::TooManyBins(_)))
        ));
    }

    #[test]
    fn silverman_uses_the_smaller_spread() {
        let h = silverman_bandwidth([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!(close(h, 0.973_584_622_850_635_7), "bandwidth {h}");
        assert_eq!(
            silverman_bandwidth([f64::NAN]),
            Err(AggregateError::EmptyDataset)
        );
        assert_eq!(
            silverman_bandwidth([2.0, 2.0]),
            Err(AggregateError::InvalidConfiguration(ConfigError::Bandwidth(0.0)))
        );
    }

    #[derive(Debug)]
    struct Penguin {
        species: &'static str,
        mass: f64,
    }

    #[test]
    fn one_curve_per_species_in_first_encounter_order() {
        let rows = [
            Penguin { species: "Gentoo", mass: 5000.0 },
            Penguin { species: "Adelie", mass: 3700.0 },
            Penguin { species: "Gentoo", mass: 5400.0 },
            Penguin { species: "Chinstrap", mass: f64::NAN },
        ];
        let ticks = density_ticks(2500.0, 6500.0, 50.0).unwrap();
        let curves = group_kde(&rows, |r| r.species, |r| r.mass, 180.0, &ticks).unwrap();
        assert_eq!(curves.keys().copied().collect::<Vec<_>>(), vec!["Gentoo", "Adelie"]);
        let adelie = curves.get(&"Adelie").unwrap();
        assert_eq!(adelie.len(), ticks.len());
        assert_eq!(*adelie, kde([3700.0], 180.0, &ticks).unwrap());
        let peak = adelie
            .iter()
            .copied()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(peak.0, 3700.0);
    }

    #[test]
    fn grouped_bandwidth_is_checked_up_front() {
        let rows: [Penguin; 0] = [];
        assert!(group_kde(&rows, |r| r.species, |r| r.mass, 1.0, &[0.0]).unwrap().is_empty());
        assert!(matches!(
            group_kde(&rows, |r| r.species, |r| r.mass, 0.0, &[0.0]),
            Err(AggregateError::InvalidConfiguration(ConfigError::Bandwidth(0.0)))
        ));
    }
}
