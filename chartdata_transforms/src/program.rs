// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Full-recompute executor for a list of transforms.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use chartdata_core::{ColId, GroupKey, TableId, Value};
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::bin::{bin_1d, bin_2d};
use crate::error::AggregateError;
use crate::group::group_aggregate;
use crate::summary::running_total;
use crate::table::{TableFrame, TableFrameError};
use crate::transform::{AggregateOp, SortOrder, Transform};

/// Composite group key for [`Transform::Aggregate`]; most charts group by one or two columns.
type KeyTuple = SmallVec<[GroupKey; 2]>;

/// Errors returned by [`Program::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// A transform's input table is neither a program input nor an earlier output.
    MissingInput(TableId),
    /// A transform reads a column its input table does not carry.
    MissingColumn {
        /// The table that lacks the column.
        table: TableId,
        /// The missing column.
        col: ColId,
    },
    /// An aggregation pass failed (bad bin configuration, or nothing to bin).
    Aggregate {
        /// The output table of the failing transform.
        output: TableId,
        /// The underlying error.
        err: AggregateError,
    },
    /// An output frame could not be assembled.
    Frame {
        /// The output table of the failing transform.
        output: TableId,
        /// The underlying error.
        err: TableFrameError,
    },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(id) => write!(f, "missing input table {}", id.0),
            Self::MissingColumn { table, col } => {
                write!(f, "table {} has no column {}", table.0, col.0)
            }
            Self::Aggregate { output, err } => write!(f, "table {}: {err}", output.0),
            Self::Frame { output, err } => write!(f, "table {}: {err}", output.0),
        }
    }
}

impl core::error::Error for ExecutionError {}

/// Output tables of a program run, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ProgramOutput {
    /// Every table produced by the program, including intermediate ones.
    pub tables: HashMap<TableId, TableFrame>,
}

impl ProgramOutput {
    /// Returns an output table.
    pub fn table(&self, id: TableId) -> Option<&TableFrame> {
        self.tables.get(&id)
    }
}

/// An ordered list of transforms.
///
/// Each transform may read a program input or the output of any earlier transform.
#[derive(Debug, Clone, Default)]
pub struct Program {
    transforms: Vec<Transform>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transform.
    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    /// The transforms, in execution order.
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Runs every transform in order against `inputs`.
    pub fn execute(
        &self,
        inputs: &HashMap<TableId, TableFrame>,
    ) -> Result<ProgramOutput, ExecutionError> {
        let mut out = ProgramOutput::default();
        for t in &self.transforms {
            let input_id = t.input();
            let frame = out
                .tables
                .get(&input_id)
                .or_else(|| inputs.get(&input_id))
                .ok_or(ExecutionError::MissingInput(input_id))?;
            for col in t.input_columns() {
                if frame.column_index(col).is_none() {
                    return Err(ExecutionError::MissingColumn {
                        table: input_id,
                        col,
                    });
                }
            }
            let result = execute_one(t, frame)?;
            tracing::debug!(
                input = input_id.0,
                output = t.output().0,
                rows_in = frame.row_count(),
                rows_out = result.row_count(),
                "executed transform"
            );
            out.tables.insert(t.output(), result);
        }
        Ok(out)
    }
}

fn execute_one(t: &Transform, frame: &TableFrame) -> Result<TableFrame, ExecutionError> {
    let rows: Vec<usize> = (0..frame.row_count()).collect();
    let num = |r: usize, col: ColId| frame.f64(r, col).unwrap_or(f64::NAN);
    let output = t.output();
    let aggregate_err = |err| ExecutionError::Aggregate { output, err };
    let frame_err = |err| ExecutionError::Frame { output, err };

    match t {
        Transform::Filter {
            predicate, columns, ..
        } => {
            let keep: Vec<usize> = rows
                .into_iter()
                .filter(|&r| frame.f64(r, predicate.col).is_some_and(|v| predicate.eval(v)))
                .collect();
            Ok(frame.select(&keep, columns))
        }
        Transform::Project { columns, .. } => Ok(frame.select(&rows, columns)),
        Transform::Sort {
            by, order, columns, ..
        } => {
            let mut sorted = rows;
            let null = Value::Null;
            let key = |r: usize| frame.value(r, *by).unwrap_or(&null);
            match order {
                SortOrder::Asc => sorted.sort_by(|&a, &b| key(a).sort_cmp(key(b))),
                SortOrder::Desc => sorted.sort_by(|&a, &b| key(b).sort_cmp(key(a))),
            }
            Ok(frame.select(&sorted, columns))
        }
        Transform::Aggregate {
            group_by, fields, ..
        } => {
            let keys: Vec<Option<KeyTuple>> = rows
                .iter()
                .map(|&r| {
                    group_by
                        .iter()
                        .map(|&c| frame.value(r, c).and_then(GroupKey::from_value))
                        .collect()
                })
                .collect();

            let mut seen: HashSet<&KeyTuple> = HashSet::new();
            let mut order: Vec<&KeyTuple> = Vec::new();
            for key in keys.iter().flatten() {
                if seen.insert(key) {
                    order.push(key);
                }
            }

            let mut columns: Vec<(ColId, Vec<Value>)> = group_by
                .iter()
                .enumerate()
                .map(|(i, &c)| (c, order.iter().map(|k| k[i].to_value()).collect()))
                .collect();
            for field in fields {
                let agg = group_aggregate(
                    &rows,
                    |&r| keys[r].clone(),
                    |&r| num(r, field.input),
                    &[field.op],
                );
                let values = order
                    .iter()
                    .map(|k| match agg.get(*k) {
                        Some(v) => Value::Number(v[0]),
                        None if field.op == AggregateOp::Count => Value::Number(0.0),
                        None => Value::Null,
                    })
                    .collect();
                columns.push((field.output, values));
            }
            TableFrame::from_columns(columns).map_err(frame_err)
        }
        Transform::Bin {
            input_col,
            spec,
            output_start,
            output_end,
            output_count,
            ..
        } => {
            let h = bin_1d(&rows, |&r| num(r, *input_col), spec).map_err(aggregate_err)?;
            TableFrame::from_columns(alloc::vec![
                (*output_start, h.bins.iter().map(|b| b.start.into()).collect()),
                (*output_end, h.bins.iter().map(|b| b.end.into()).collect()),
                (
                    *output_count,
                    h.bins.iter().map(|b| (b.count as f64).into()).collect(),
                ),
            ])
            .map_err(frame_err)
        }
        Transform::Bin2d {
            x_col,
            y_col,
            spec_x,
            spec_y,
            mode,
            output_x_start,
            output_x_end,
            output_y_start,
            output_y_end,
            output_count,
            ..
        } => {
            let h = bin_2d(
                &rows,
                |&r| num(r, *x_col),
                |&r| num(r, *y_col),
                spec_x,
                spec_y,
                *mode,
            )
            .map_err(aggregate_err)?;
            let cells = &h.cells;
            TableFrame::from_columns(alloc::vec![
                (*output_x_start, cells.iter().map(|c| c.cell.x0.into()).collect()),
                (*output_x_end, cells.iter().map(|c| c.cell.x1.into()).collect()),
                (*output_y_start, cells.iter().map(|c| c.cell.y0.into()).collect()),
                (*output_y_end, cells.iter().map(|c| c.cell.y1.into()).collect()),
                (
                    *output_count,
                    cells.iter().map(|c| (c.count as f64).into()).collect(),
                ),
            ])
            .map_err(frame_err)
        }
        Transform::Cumulate {
            field,
            output_col,
            columns,
            ..
        } => {
            let mut out = frame.select(&rows, columns);
            let totals = running_total(rows.iter().map(|&r| num(r, *field)));
            out.columns.push(*output_col);
            out.data.push(totals.into_iter().map(Value::Number).collect());
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::bin::{BinSpec, GridMode};
    use crate::transform::{AggregateField, CompareOp, Predicate};

    const SRC: TableId = TableId(1);
    const YEAR: ColId = ColId(0);
    const COST: ColId = ColId(1);
    const KIND: ColId = ColId(2);

    fn disasters() -> HashMap<TableId, TableFrame> {
        let frame = TableFrame::from_columns(vec![
            (
                YEAR,
                vec![2005.0.into(), 2005.0.into(), 2006.0.into(), 2007.0.into()],
            ),
            (
                COST,
                vec![10.0.into(), 5.0.into(), 3.0.into(), Value::Null],
            ),
            (
                KIND,
                vec!["storm".into(), "flood".into(), "storm".into(), "storm".into()],
            ),
        ])
        .unwrap();
        let mut inputs = HashMap::new();
        inputs.insert(SRC, frame);
        inputs
    }

    fn numbers(frame: &TableFrame, col: ColId) -> Vec<f64> {
        frame
            .column(col)
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap_or(f64::NAN))
            .collect()
    }

    #[test]
    fn aggregate_sums_per_group_in_first_encounter_order() {
        let mut p = Program::new();
        p.push(Transform::Aggregate {
            input: SRC,
            output: TableId(2),
            group_by: vec![YEAR],
            fields: vec![
                AggregateField {
                    op: AggregateOp::Sum,
                    input: COST,
                    output: ColId(10),
                },
                AggregateField {
                    op: AggregateOp::Count,
                    input: COST,
                    output: ColId(11),
                },
            ],
        });
        let out = p.execute(&disasters()).unwrap();
        let t = out.table(TableId(2)).unwrap();
        assert_eq!(t.columns, vec![YEAR, ColId(10), ColId(11)]);
        assert_eq!(numbers(t, YEAR), vec![2005.0, 2006.0, 2007.0]);
        assert_eq!(t.value(0, ColId(10)), Some(&Value::Number(15.0)));
        assert_eq!(t.value(1, ColId(10)), Some(&Value::Number(3.0)));
        // 2007 has a key but no finite cost.
        assert_eq!(t.value(2, ColId(10)), Some(&Value::Null));
        assert_eq!(t.value(2, ColId(11)), Some(&Value::Number(0.0)));
    }

    #[test]
    fn aggregate_groups_by_two_columns() {
        let mut p = Program::new();
        p.push(Transform::Aggregate {
            input: SRC,
            output: TableId(2),
            group_by: vec![KIND, YEAR],
            fields: vec![AggregateField {
                op: AggregateOp::Sum,
                input: COST,
                output: ColId(10),
            }],
        });
        let out = p.execute(&disasters()).unwrap();
        let t = out.table(TableId(2)).unwrap();
        assert_eq!(t.row_count(), 4);
        assert_eq!(t.value(1, KIND), Some(&Value::from("flood")));
    }

    #[test]
    fn filter_sort_and_cumulate_chain() {
        let mut p = Program::new();
        p.push(Transform::Filter {
            input: SRC,
            output: TableId(2),
            predicate: Predicate::finite(COST),
            columns: vec![YEAR, COST],
        });
        p.push(Transform::Sort {
            input: TableId(2),
            output: TableId(3),
            by: COST,
            order: SortOrder::Asc,
            columns: vec![YEAR, COST],
        });
        p.push(Transform::Cumulate {
            input: TableId(3),
            output: TableId(4),
            field: COST,
            output_col: ColId(20),
            columns: vec![COST],
        });
        let out = p.execute(&disasters()).unwrap();
        let t = out.table(TableId(4)).unwrap();
        assert_eq!(numbers(t, COST), vec![3.0, 5.0, 10.0]);
        assert_eq!(numbers(t, ColId(20)), vec![3.0, 8.0, 18.0]);
        assert_eq!(t.row_keys, vec![2, 1, 0]);
    }

    #[test]
    fn filter_compares_numbers() {
        let mut p = Program::new();
        p.push(Transform::Filter {
            input: SRC,
            output: TableId(2),
            predicate: Predicate {
                col: YEAR,
                op: CompareOp::Ge,
                value: 2006.0,
            },
            columns: vec![YEAR],
        });
        let out = p.execute(&disasters()).unwrap();
        assert_eq!(numbers(out.table(TableId(2)).unwrap(), YEAR), vec![2006.0, 2007.0]);
    }

    #[test]
    fn bin_produces_one_row_per_bin() {
        let mut p = Program::new();
        p.push(Transform::Bin {
            input: SRC,
            output: TableId(2),
            input_col: COST,
            spec: BinSpec::fixed(2).with_domain(0.0, 10.0),
            output_start: ColId(0),
            output_end: ColId(1),
            output_count: ColId(2),
        });
        let out = p.execute(&disasters()).unwrap();
        let t = out.table(TableId(2)).unwrap();
        assert_eq!(numbers(t, ColId(0)), vec![0.0, 5.0]);
        assert_eq!(numbers(t, ColId(1)), vec![5.0, 10.0]);
        assert_eq!(numbers(t, ColId(2)), vec![1.0, 2.0]);
    }

    #[test]
    fn bin2d_dense_grid_has_every_cell() {
        let mut p = Program::new();
        p.push(Transform::Bin2d {
            input: SRC,
            output: TableId(2),
            x_col: YEAR,
            y_col: COST,
            spec_x: BinSpec::fixed(2).with_domain(2005.0, 2007.0),
            spec_y: BinSpec::fixed(2).with_domain(0.0, 10.0),
            mode: GridMode::Dense,
            output_x_start: ColId(0),
            output_x_end: ColId(1),
            output_y_start: ColId(2),
            output_y_end: ColId(3),
            output_count: ColId(4),
        });
        let out = p.execute(&disasters()).unwrap();
        let t = out.table(TableId(2)).unwrap();
        assert_eq!(t.row_count(), 4);
        // The 2007 row has no cost and is skipped.
        assert_eq!(numbers(t, ColId(4)), vec![0.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn errors_name_the_failing_table() {
        let mut p = Program::new();
        p.push(Transform::Project {
            input: TableId(99),
            output: TableId(2),
            columns: vec![YEAR],
        });
        assert_eq!(
            p.execute(&disasters()).unwrap_err(),
            ExecutionError::MissingInput(TableId(99))
        );

        let mut p = Program::new();
        p.push(Transform::Project {
            input: SRC,
            output: TableId(2),
            columns: vec![ColId(42)],
        });
        assert_eq!(
            p.execute(&disasters()).unwrap_err(),
            ExecutionError::MissingColumn {
                table: SRC,
                col: ColId(42)
            }
        );

        let mut p = Program::new();
        p.push(Transform::Bin {
            input: SRC,
            output: TableId(2),
            input_col: COST,
            spec: BinSpec::fixed(0),
            output_start: ColId(0),
            output_end: ColId(1),
            output_count: ColId(2),
        });
        assert!(matches!(
            p.execute(&disasters()).unwrap_err(),
            ExecutionError::Aggregate {
                output: TableId(2),
                err: AggregateError::InvalidConfiguration(_)
            }
        ));
    }
}
