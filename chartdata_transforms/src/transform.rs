// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform IR types.

extern crate alloc;

use alloc::vec::Vec;

use chartdata_core::{ColId, TableId};

use crate::bin::{BinSpec, GridMode};

/// Aggregation operation for [`Transform::Aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateOp {
    /// Count rows with a finite value.
    Count,
    /// Sum values (skips non-finite).
    Sum,
    /// Minimum value (skips non-finite).
    Min,
    /// Maximum value (skips non-finite).
    Max,
    /// Mean value (skips non-finite).
    Mean,
}

/// A single aggregated output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateField {
    /// Operation to apply.
    pub op: AggregateOp,
    /// Input column.
    pub input: ColId,
    /// Output column id.
    pub output: ColId,
}

/// Sorting order for [`Transform::Sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// Comparison operators for numeric predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==` (exact float equality)
    Eq,
    /// `!=` (exact float inequality)
    Ne,
    /// The value is a finite number; `value` is ignored.
    ///
    /// Used as the up-front required-field filter.
    Finite,
}

/// A row predicate used by [`Transform::Filter`].
///
/// Rows whose column is missing or not numeric never match.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column to read.
    pub col: ColId,
    /// Comparison operator.
    pub op: CompareOp,
    /// Right-hand constant.
    pub value: f64,
}

impl Predicate {
    /// A predicate that keeps rows where `col` holds a finite number.
    pub fn finite(col: ColId) -> Self {
        Self {
            col,
            op: CompareOp::Finite,
            value: 0.0,
        }
    }

    /// Evaluate the predicate for a given numeric value.
    pub fn eval(&self, v: f64) -> bool {
        match self.op {
            CompareOp::Lt => v < self.value,
            CompareOp::Le => v <= self.value,
            CompareOp::Gt => v > self.value,
            CompareOp::Ge => v >= self.value,
            CompareOp::Eq => v == self.value,
            CompareOp::Ne => v != self.value,
            CompareOp::Finite => v.is_finite(),
        }
    }
}

/// A table transform from an input table to an output table.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Keep only rows that satisfy a predicate.
    Filter {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Predicate to apply per row.
        predicate: Predicate,
        /// Columns to carry through to the output table.
        columns: Vec<ColId>,
    },
    /// Select a subset of columns.
    Project {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Columns to include in the output table.
        columns: Vec<ColId>,
    },
    /// Reorder rows by a key column.
    ///
    /// Numbers sort before text; missing values sort last in ascending order. The sort is stable.
    Sort {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Column used as the sort key.
        by: ColId,
        /// Sort order.
        order: SortOrder,
        /// Columns to carry through to the output table.
        columns: Vec<ColId>,
    },
    /// Group rows by one or more key columns and compute aggregates.
    ///
    /// Output columns are `group_by` (in order) followed by the `fields` outputs (in order).
    /// Groups appear in first-encounter order. Rows with a missing key are dropped.
    Aggregate {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Group-by key columns.
        group_by: Vec<ColId>,
        /// Aggregated fields.
        fields: Vec<AggregateField>,
    },
    /// Bin a numeric column into a histogram table, one row per bin.
    ///
    /// Output columns are `output_start`, `output_end`, `output_count`.
    Bin {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Input column to bin.
        input_col: ColId,
        /// Bin count/step and domain.
        spec: BinSpec,
        /// Output column containing the bin start value.
        output_start: ColId,
        /// Output column containing the bin end value.
        output_end: ColId,
        /// Output column containing the bin count.
        output_count: ColId,
    },
    /// Bin two numeric columns into a 2D histogram table, one row per cell.
    ///
    /// Output columns are `output_x_start`, `output_x_end`, `output_y_start`, `output_y_end`,
    /// `output_count`. Cells are ordered by x bin, then y bin.
    Bin2d {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Column binned along x.
        x_col: ColId,
        /// Column binned along y.
        y_col: ColId,
        /// Binning along x.
        spec_x: BinSpec,
        /// Binning along y.
        spec_y: BinSpec,
        /// Dense (every cell) or sparse (non-empty cells only).
        mode: GridMode,
        /// Output column for the x bin start.
        output_x_start: ColId,
        /// Output column for the x bin end.
        output_x_end: ColId,
        /// Output column for the y bin start.
        output_y_start: ColId,
        /// Output column for the y bin end.
        output_y_end: ColId,
        /// Output column for the cell count.
        output_count: ColId,
    },
    /// Append a running total of `field`, in row order.
    ///
    /// Run [`Transform::Sort`] upstream for an ascending running total. Output columns are
    /// `columns` (in order) followed by `output`.
    Cumulate {
        /// Input table.
        input: TableId,
        /// Output table.
        output: TableId,
        /// Column to accumulate. Non-finite values contribute nothing.
        field: ColId,
        /// Output column containing the running total.
        output_col: ColId,
        /// Columns to carry through to the output table.
        columns: Vec<ColId>,
    },
}

impl Transform {
    /// The input table of this transform.
    pub fn input(&self) -> TableId {
        match self {
            Self::Filter { input, .. }
            | Self::Project { input, .. }
            | Self::Sort { input, .. }
            | Self::Aggregate { input, .. }
            | Self::Bin { input, .. }
            | Self::Bin2d { input, .. }
            | Self::Cumulate { input, .. } => *input,
        }
    }

    /// The output table of this transform.
    pub fn output(&self) -> TableId {
        match self {
            Self::Filter { output, .. }
            | Self::Project { output, .. }
            | Self::Sort { output, .. }
            | Self::Aggregate { output, .. }
            | Self::Bin { output, .. }
            | Self::Bin2d { output, .. }
            | Self::Cumulate { output, .. } => *output,
        }
    }

    /// Input columns this transform reads.
    pub fn input_columns(&self) -> Vec<ColId> {
        let mut cols = Vec::new();
        match self {
            Self::Filter {
                predicate, columns, ..
            } => {
                cols.extend_from_slice(columns);
                cols.push(predicate.col);
            }
            Self::Project { columns, .. } => cols.extend_from_slice(columns),
            Self::Sort { by, columns, .. } => {
                cols.extend_from_slice(columns);
                cols.push(*by);
            }
            Self::Aggregate {
                group_by, fields, ..
            } => {
                cols.extend_from_slice(group_by);
                cols.extend(fields.iter().map(|f| f.input));
            }
            Self::Bin { input_col, .. } => cols.push(*input_col),
            Self::Bin2d { x_col, y_col, .. } => {
                cols.push(*x_col);
                cols.push(*y_col);
            }
            Self::Cumulate { field, columns, .. } => {
                cols.extend_from_slice(columns);
                cols.push(*field);
            }
        }
        cols
    }
}
