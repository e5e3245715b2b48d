// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Aggregation errors.

use core::fmt;

/// A configuration value that cannot produce a well-formed aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A bin count of zero.
    ZeroBins,
    /// A bin step that is zero, negative, or not finite.
    Step(f64),
    /// A domain with `max <= min`, a non-finite bound, or a span too wide to represent.
    Domain {
        /// Lower bound as supplied.
        min: f64,
        /// Upper bound as supplied.
        max: f64,
    },
    /// A grid that would exceed [`MAX_BINS`](crate::MAX_BINS) bins per axis or
    /// [`MAX_CELLS`](crate::MAX_CELLS) cells in two dimensions.
    TooManyBins(f64),
    /// A quantile probability outside `[0, 1]`.
    Quantile(f64),
    /// A kernel bandwidth that is zero, negative, or not finite.
    Bandwidth(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroBins => f.write_str("bin count must be positive"),
            Self::Step(step) => write!(f, "bin step must be positive and finite, got {step}"),
            Self::Domain { min, max } => {
                write!(f, "domain [{min}, {max}] is empty or not finite")
            }
            Self::TooManyBins(n) => write!(f, "bin grid would need {n} bins"),
            Self::Quantile(p) => write!(f, "quantile must be within [0, 1], got {p}"),
            Self::Bandwidth(h) => {
                write!(f, "kernel bandwidth must be positive and finite, got {h}")
            }
        }
    }
}

/// Errors returned by grouping, binning and summary passes.
///
/// These are local to one aggregation: the caller decides how to render the failure (typically
/// an empty-state placeholder) and other charts are unaffected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateError {
    /// The caller supplied a configuration that cannot be honored.
    InvalidConfiguration(ConfigError),
    /// There were no finite values to aggregate and nothing else to go on.
    EmptyDataset,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfiguration(err) => write!(f, "invalid configuration: {err}"),
            Self::EmptyDataset => f.write_str("no finite values to aggregate"),
        }
    }
}

impl core::error::Error for AggregateError {}

impl From<ConfigError> for AggregateError {
    fn from(value: ConfigError) -> Self {
        Self::InvalidConfiguration(value)
    }
}
