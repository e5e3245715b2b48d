// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aggregation passes that turn flat records into chart-ready rows.
//!
//! Four families of pure functions cover what gallery charts need:
//! - **Grouping** ([`group`], [`group_aggregate`], [`group_summaries`]) collapses records that
//!   share a key, for bar, donut and treemap charts.
//! - **Binning** ([`bin_1d`], [`bin_1d_multi`], [`bin_2d`]) counts values into contiguous
//!   intervals, for histograms and heatmaps.
//! - **Summaries** ([`summarize`], [`quantile`], [`cumulative_sum`]) reduce one field to headline
//!   statistics, for box plots and cumulative curves.
//! - **Densities** ([`kde`], [`group_kde`]) smooth a distribution with a Gaussian kernel, for
//!   density and violin charts.
//!
//! Every pass borrows its input immutably and allocates a fresh result, so the same records can
//! feed several charts. Non-finite values never poison a result: they are skipped and, where the
//! output has room for it, tallied.
//!
//! For charts that work on columnar tables, the same passes are available as a small transform IR
//! ([`Transform`], [`Program`]) executed in full-recompute mode against a `chartdata_core::Scene`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod bin;
mod density;
mod error;
#[cfg(not(feature = "std"))]
mod float;
mod group;
mod program;
mod scene;
mod summary;
mod table;
mod transform;

pub use bin::{
    Bin, Bin2D, BinCount, BinGrid, BinSpec, GridMode, Histogram, Histogram2D, MAX_BINS, MAX_CELLS,
    MultiBin, MultiHistogram, bin_1d, bin_1d_multi, bin_2d, extent,
};
pub use density::{density_ticks, group_kde, kde, silverman_bandwidth};
pub use error::{AggregateError, ConfigError};
pub use group::{Grouped, group, group_aggregate, group_summaries};
pub use program::{ExecutionError, Program, ProgramOutput};
pub use scene::SceneExecutionError;
pub use summary::{
    Quartiles, ScalarSummary, cumulative_share, cumulative_sum, quantile, running_total,
    summarize, summarize_values, summarize_with_quartiles,
};
pub use table::{TableFrame, TableFrameError};
pub use transform::{AggregateField, AggregateOp, CompareOp, Predicate, SortOrder, Transform};
