// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Histogram binning.
//!
//! A binning pass resolves a [`BinSpec`] into a uniform grid over a domain, then counts each
//! finite value into exactly one bin:
//! - bins are half-open `[start, end)` except the last, which is closed so the domain maximum
//!   lands in it,
//! - zero-count bins are always emitted so chart axes stay contiguous, and
//! - values that are non-finite or fall outside the grid are tallied, never silently dropped.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use kurbo::Rect;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::error::{AggregateError, ConfigError};

/// Upper bound on the number of bins a single grid may have.
pub const MAX_BINS: usize = 10_000;

/// Upper bound on the number of cells in a 2D grid.
pub const MAX_CELLS: usize = 1_000_000;

/// How a domain is divided into bins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinCount {
    /// Exactly this many equal-width bins spanning the domain.
    Fixed(usize),
    /// Bins of this width, starting at the domain minimum. The last bin may extend past the
    /// domain maximum so the grid covers it.
    Step(f64),
    /// A 1/2/5 x 10^k step giving at most `max_bins` bins; the domain is widened outward to
    /// step multiples (Vega-Lite's `maxbins`).
    Nice {
        /// Upper bound on the bin count.
        max_bins: usize,
    },
}

/// Binning configuration for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinSpec {
    /// Bin count or width.
    pub count: BinCount,
    /// Explicit domain. When `None`, it is derived as `[floor(min), ceil(max)]` of the observed
    /// finite values.
    pub domain: Option<(f64, f64)>,
}

impl BinSpec {
    /// `n` equal-width bins over the observed domain.
    pub fn fixed(n: usize) -> Self {
        Self {
            count: BinCount::Fixed(n),
            domain: None,
        }
    }

    /// Bins of width `step`.
    pub fn step(step: f64) -> Self {
        Self {
            count: BinCount::Step(step),
            domain: None,
        }
    }

    /// "Nice" bins, at most `max_bins` of them.
    pub fn nice(max_bins: usize) -> Self {
        Self {
            count: BinCount::Nice { max_bins },
            domain: None,
        }
    }

    /// Sets an explicit domain.
    pub fn with_domain(mut self, min: f64, max: f64) -> Self {
        self.domain = Some((min, max));
        self
    }

    /// Resolves this spec into a concrete grid.
    ///
    /// `observed` is the `(min, max)` of the finite input values, if any. It is only consulted
    /// when no explicit domain is configured.
    pub fn resolve(&self, observed: Option<(f64, f64)>) -> Result<BinGrid, AggregateError> {
        let (min, max) = match self.domain {
            Some(domain) => domain,
            None => {
                let (lo, hi) = observed.ok_or(AggregateError::EmptyDataset)?;
                let (lo, hi) = (lo.floor(), hi.ceil());
                // A single repeated value still gets one populated bin.
                if hi <= lo { (lo, lo + 1.0) } else { (lo, hi) }
            }
        };
        // A finite domain can still overflow its span (e.g. `[-1e308, 1e308]`).
        if !(min.is_finite() && max.is_finite() && max > min && (max - min).is_finite()) {
            return Err(ConfigError::Domain { min, max }.into());
        }

        let grid = self.grid_over(min, max)?;
        if !(grid.start.is_finite() && grid.stop.is_finite() && grid.width > 0.0) {
            return Err(ConfigError::Domain { min, max }.into());
        }
        Ok(grid)
    }

    fn grid_over(&self, min: f64, max: f64) -> Result<BinGrid, AggregateError> {
        let span = max - min;
        match self.count {
            BinCount::Fixed(0) | BinCount::Nice { max_bins: 0 } => {
                Err(ConfigError::ZeroBins.into())
            }
            BinCount::Fixed(n) => {
                if n > MAX_BINS {
                    return Err(ConfigError::TooManyBins(n as f64).into());
                }
                Ok(BinGrid {
                    start: min,
                    stop: max,
                    width: span / n as f64,
                    count: n,
                })
            }
            BinCount::Step(step) => {
                if !(step.is_finite() && step > 0.0) {
                    return Err(ConfigError::Step(step).into());
                }
                // Tolerate float noise when the span is a whole multiple of the step.
                let n_f = (span / step - 1e-9).ceil().max(1.0);
                let count = bin_count_from(n_f)?;
                // Rounding in `min + step * count` can land an ulp short of `max`.
                Ok(BinGrid {
                    start: min,
                    stop: (min + step * count as f64).max(max),
                    width: step,
                    count,
                })
            }
            BinCount::Nice { max_bins } => {
                let snapped = |step: f64| ((max / step).ceil() - (min / step).floor()).max(1.0);
                let mut step = nice_step(span / max_bins as f64);
                let mut n_f = snapped(step);
                // Snapping outward can add a bin; bump to the next nice step if it did.
                let mut attempts = 0;
                while n_f > max_bins as f64 && attempts < 16 {
                    step = nice_step(step * 1.01);
                    n_f = snapped(step);
                    attempts += 1;
                }
                if n_f > max_bins as f64 {
                    // A domain straddling a step multiple can never fit in one nice bin.
                    return Ok(BinGrid {
                        start: min,
                        stop: max,
                        width: span / max_bins as f64,
                        count: max_bins,
                    });
                }
                let count = bin_count_from(n_f)?;
                let start = (min / step).floor() * step;
                Ok(BinGrid {
                    start,
                    stop: start + step * count as f64,
                    width: step,
                    count,
                })
            }
        }
    }
}

fn bin_count_from(n_f: f64) -> Result<usize, AggregateError> {
    if !n_f.is_finite() || n_f > MAX_BINS as f64 {
        return Err(ConfigError::TooManyBins(n_f).into());
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "finite and capped at MAX_BINS"
    )]
    let n = n_f.round() as usize;
    Ok(n.max(1))
}

/// Rounds `step` up to the nearest 1, 2, 5 or 10 times a power of ten.
fn nice_step(step: f64) -> f64 {
    let power = step.log10().floor();
    #[allow(
        clippy::cast_possible_truncation,
        reason = "log10 of a finite positive f64 is within i32"
    )]
    let base = 10_f64.powi(power as i32);
    let error = step / base;
    let nice = if error > 5.0 {
        10.0
    } else if error > 2.0 {
        5.0
    } else if error > 1.0 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// A resolved uniform bin grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinGrid {
    /// Start of the first bin.
    pub start: f64,
    /// End of the last bin (inclusive).
    pub stop: f64,
    /// Width of every bin.
    pub width: f64,
    /// Number of bins.
    pub count: usize,
}

impl BinGrid {
    /// Start of bin `i`. `bin_start(count)` is `stop`.
    pub fn bin_start(&self, i: usize) -> f64 {
        if i >= self.count {
            self.stop
        } else {
            self.start + self.width * i as f64
        }
    }

    /// End of bin `i`, which is the start of bin `i + 1`.
    pub fn bin_end(&self, i: usize) -> f64 {
        self.bin_start(i + 1)
    }

    /// Returns the bin index for `v`, or `None` if `v` is outside `[start, stop]` or not finite.
    pub fn index_of(&self, v: f64) -> Option<usize> {
        if !(v >= self.start && v <= self.stop) {
            return None;
        }
        let raw = ((v - self.start) / self.width).floor();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "v is within the grid, so raw is within [0, count]"
        )]
        let mut i = (raw.max(0.0) as usize).min(self.count - 1);
        // The division can land one bin off at edges; settle on the bin whose bounds hold `v`.
        while i > 0 && v < self.bin_start(i) {
            i -= 1;
        }
        while i + 1 < self.count && v >= self.bin_start(i + 1) {
            i += 1;
        }
        Some(i)
    }

    /// Empty bins spanning the grid.
    pub fn empty_bins(&self) -> Vec<Bin> {
        (0..self.count)
            .map(|i| Bin {
                start: self.bin_start(i),
                end: self.bin_end(i),
                count: 0,
            })
            .collect()
    }
}

/// One histogram bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    /// Inclusive lower bound.
    pub start: f64,
    /// Exclusive upper bound (inclusive for the last bin).
    pub end: f64,
    /// Number of values in the bin.
    pub count: usize,
}

impl Bin {
    /// Midpoint, used as the x position by line and area histograms.
    pub fn mid(&self) -> f64 {
        (self.start + self.end) * 0.5
    }
}

/// Result of a 1D binning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// The grid the bins were built from.
    pub grid: BinGrid,
    /// Bins in ascending order, including empty ones.
    pub bins: Vec<Bin>,
    /// Values skipped because they were not finite.
    pub skipped_non_finite: usize,
    /// Finite values skipped because they fell outside the grid.
    pub skipped_out_of_range: usize,
}

impl Histogram {
    /// Sum of all bin counts.
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Largest bin count (0 for an empty histogram).
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// Observed `(min, max)` of the finite values, like a scale's domain inference.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if !v.is_finite() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// Bins `field` over `records`.
///
/// Fails with `InvalidConfiguration` for a zero bin count, a bad step or a degenerate domain, and
/// with `EmptyDataset` if no domain is configured and there are no finite values to derive one.
/// With an explicit domain, empty input yields all-zero bins.
pub fn bin_1d<R>(
    records: &[R],
    field: impl Fn(&R) -> f64,
    spec: &BinSpec,
) -> Result<Histogram, AggregateError> {
    let observed = if spec.domain.is_some() {
        None
    } else {
        extent(records.iter().map(&field))
    };
    let grid = spec.resolve(observed)?;
    let mut bins = grid.empty_bins();
    let mut skipped_non_finite = 0;
    let mut skipped_out_of_range = 0;
    for r in records {
        let v = field(r);
        if !v.is_finite() {
            skipped_non_finite += 1;
            continue;
        }
        match grid.index_of(v) {
            Some(i) => bins[i].count += 1,
            None => {
                tracing::trace!(value = v, "value outside bin grid");
                skipped_out_of_range += 1;
            }
        }
    }
    tracing::debug!(
        bins = grid.count,
        width = grid.width,
        skipped_non_finite,
        skipped_out_of_range,
        "binned field"
    );
    Ok(Histogram {
        grid,
        bins,
        skipped_non_finite,
        skipped_out_of_range,
    })
}

/// One bin shared by several series.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiBin {
    /// Inclusive lower bound.
    pub start: f64,
    /// Exclusive upper bound (inclusive for the last bin).
    pub end: f64,
    /// Count per series, in the order the fields were given.
    pub counts: Vec<usize>,
}

impl MultiBin {
    /// Midpoint of the bin.
    pub fn mid(&self) -> f64 {
        (self.start + self.end) * 0.5
    }
}

/// Result of binning several series into one shared grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiHistogram {
    /// The shared grid.
    pub grid: BinGrid,
    /// Bins in ascending order.
    pub bins: Vec<MultiBin>,
    /// Non-finite values skipped, per series.
    pub skipped_non_finite: Vec<usize>,
    /// Out-of-grid values skipped, per series.
    pub skipped_out_of_range: Vec<usize>,
}

impl MultiHistogram {
    /// The histogram of a single series.
    pub fn series(&self, index: usize) -> Option<Histogram> {
        let skipped_non_finite = *self.skipped_non_finite.get(index)?;
        let skipped_out_of_range = *self.skipped_out_of_range.get(index)?;
        Some(Histogram {
            grid: self.grid,
            bins: self
                .bins
                .iter()
                .map(|b| Bin {
                    start: b.start,
                    end: b.end,
                    count: b.counts[index],
                })
                .collect(),
            skipped_non_finite,
            skipped_out_of_range,
        })
    }
}

/// Bins several numeric series of the same records into one shared grid, for overlaid
/// histograms. A derived domain spans the values of all series.
pub fn bin_1d_multi<R>(
    records: &[R],
    fields: &[&dyn Fn(&R) -> f64],
    spec: &BinSpec,
) -> Result<MultiHistogram, AggregateError> {
    let observed = if spec.domain.is_some() {
        None
    } else {
        extent(
            fields
                .iter()
                .flat_map(|f| records.iter().map(move |r| f(r))),
        )
    };
    let grid = spec.resolve(observed)?;
    let series = fields.len();
    let mut bins: Vec<MultiBin> = (0..grid.count)
        .map(|i| MultiBin {
            start: grid.bin_start(i),
            end: grid.bin_end(i),
            counts: vec![0; series],
        })
        .collect();
    let mut skipped_non_finite = vec![0; series];
    let mut skipped_out_of_range = vec![0; series];
    for r in records {
        for (s, f) in fields.iter().enumerate() {
            let v = f(r);
            if !v.is_finite() {
                skipped_non_finite[s] += 1;
                continue;
            }
            match grid.index_of(v) {
                Some(i) => bins[i].counts[s] += 1,
                None => skipped_out_of_range[s] += 1,
            }
        }
    }
    tracing::debug!(bins = grid.count, series, "binned series");
    Ok(MultiHistogram {
        grid,
        bins,
        skipped_non_finite,
        skipped_out_of_range,
    })
}

/// Whether a 2D pass emits every cell or only populated ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// The full `x_bins * y_bins` grid, including zero-count cells (heatmaps with a fill for
    /// empty cells).
    Dense,
    /// Only cells with a non-zero count (density scatter charts).
    Sparse,
}

/// One 2D bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin2D {
    /// Bin index along x.
    pub x: usize,
    /// Bin index along y.
    pub y: usize,
    /// Cell bounds in data space: `x0..x1` is the x interval, `y0..y1` the y interval.
    pub cell: Rect,
    /// Number of records in the cell.
    pub count: usize,
}

/// Result of a 2D binning pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    /// Grid along x.
    pub x_grid: BinGrid,
    /// Grid along y.
    pub y_grid: BinGrid,
    /// Cells ordered by x index, then y index.
    pub cells: Vec<Bin2D>,
    /// Records skipped because either value was not finite.
    pub skipped_non_finite: usize,
    /// Records skipped because either value fell outside its grid.
    pub skipped_out_of_range: usize,
}

impl Histogram2D {
    /// Sum of all cell counts.
    pub fn total(&self) -> usize {
        self.cells.iter().map(|c| c.count).sum()
    }

    /// Largest cell count, for colour scale domains.
    pub fn max_count(&self) -> usize {
        self.cells.iter().map(|c| c.count).max().unwrap_or(0)
    }
}

/// Bins records by two numeric fields at once.
///
/// Each axis follows the same rules as [`bin_1d`]. A record contributes to a cell only if both
/// values are finite and inside their grids.
pub fn bin_2d<R>(
    records: &[R],
    field_x: impl Fn(&R) -> f64,
    field_y: impl Fn(&R) -> f64,
    spec_x: &BinSpec,
    spec_y: &BinSpec,
    mode: GridMode,
) -> Result<Histogram2D, AggregateError> {
    let pairs = || {
        records
            .iter()
            .map(|r| (field_x(r), field_y(r)))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    };
    let x_grid = spec_x.resolve(if spec_x.domain.is_some() {
        None
    } else {
        extent(pairs().map(|(x, _)| x))
    })?;
    let y_grid = spec_y.resolve(if spec_y.domain.is_some() {
        None
    } else {
        extent(pairs().map(|(_, y)| y))
    })?;

    let cell_count = x_grid.count.saturating_mul(y_grid.count);
    if cell_count > MAX_CELLS {
        return Err(ConfigError::TooManyBins(cell_count as f64).into());
    }
    let mut counts = vec![0_usize; cell_count];
    let mut skipped_non_finite = 0;
    let mut skipped_out_of_range = 0;
    for r in records {
        let (x, y) = (field_x(r), field_y(r));
        if !(x.is_finite() && y.is_finite()) {
            skipped_non_finite += 1;
            continue;
        }
        match (x_grid.index_of(x), y_grid.index_of(y)) {
            (Some(xi), Some(yi)) => counts[xi * y_grid.count + yi] += 1,
            _ => skipped_out_of_range += 1,
        }
    }

    let mut cells = Vec::new();
    for xi in 0..x_grid.count {
        for yi in 0..y_grid.count {
            let count = counts[xi * y_grid.count + yi];
            if mode == GridMode::Sparse && count == 0 {
                continue;
            }
            cells.push(Bin2D {
                x: xi,
                y: yi,
                cell: Rect::new(
                    x_grid.bin_start(xi),
                    y_grid.bin_start(yi),
                    x_grid.bin_end(xi),
                    y_grid.bin_end(yi),
                ),
                count,
            });
        }
    }
    tracing::debug!(
        x_bins = x_grid.count,
        y_bins = y_grid.count,
        cells = cells.len(),
        skipped_non_finite,
        skipped_out_of_range,
        "binned field pair"
    );
    Ok(Histogram2D {
        x_grid,
        y_grid,
        cells,
        skipped_non_finite,
        skipped_out_of_range,
    })
}
