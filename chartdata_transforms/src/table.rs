// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Owned table representation used by the transform executor.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use chartdata_core::{ColId, Table, TableData, TableId, Value};

/// Errors returned when building or using a [`TableFrame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableFrameError {
    /// The requested column list is empty.
    EmptyColumns,
    /// The input table does not have a data accessor.
    MissingData,
    /// A column's length does not match the row count.
    RaggedColumn(ColId),
}

impl fmt::Display for TableFrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyColumns => f.write_str("no columns requested"),
            Self::MissingData => f.write_str("table has no data accessor"),
            Self::RaggedColumn(col) => write!(f, "column {} has the wrong length", col.0),
        }
    }
}

impl core::error::Error for TableFrameError {}

/// An owned columnar table used as input/output of transform execution.
///
/// - stable `row_keys` (for downstream mark identity),
/// - a fixed set of columns, each a `Vec<Value>` aligned to `row_keys`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFrame {
    /// Stable keys for each row.
    pub row_keys: Vec<u64>,
    /// Column ids carried by this frame.
    pub columns: Vec<ColId>,
    /// Columnar data, aligned to `columns`.
    pub data: Vec<Vec<Value>>,
}

impl TableFrame {
    /// Create an empty frame.
    pub fn new(columns: Vec<ColId>) -> Result<Self, TableFrameError> {
        if columns.is_empty() {
            return Err(TableFrameError::EmptyColumns);
        }
        let data = columns.iter().map(|_| Vec::new()).collect();
        Ok(Self {
            row_keys: Vec::new(),
            columns,
            data,
        })
    }

    /// Builds a frame from whole columns. Rows are keyed by index.
    pub fn from_columns(columns: Vec<(ColId, Vec<Value>)>) -> Result<Self, TableFrameError> {
        let Some(n) = columns.first().map(|(_, c)| c.len()) else {
            return Err(TableFrameError::EmptyColumns);
        };
        if let Some((col, _)) = columns.iter().find(|(_, c)| c.len() != n) {
            return Err(TableFrameError::RaggedColumn(*col));
        }
        let (ids, data): (Vec<ColId>, Vec<Vec<Value>>) = columns.into_iter().unzip();
        Ok(Self {
            row_keys: (0..n as u64).collect(),
            columns: ids,
            data,
        })
    }

    /// Extract a frame from a `chartdata_core` table.
    ///
    /// Missing values are represented as [`Value::Null`].
    pub fn from_table(table: &Table, columns: Vec<ColId>) -> Result<Self, TableFrameError> {
        if columns.is_empty() {
            return Err(TableFrameError::EmptyColumns);
        }
        let Some(data) = table.data.as_deref() else {
            return Err(TableFrameError::MissingData);
        };
        let n = table.row_keys.len();
        let mut cols = Vec::with_capacity(columns.len());
        for &col in &columns {
            let mut out = Vec::with_capacity(n);
            for row in 0..n {
                out.push(data.value(row, col).unwrap_or_default());
            }
            cols.push(out);
        }
        Ok(Self {
            row_keys: table.row_keys.clone(),
            columns,
            data: cols,
        })
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }

    /// Returns a column index for a `ColId`, if present.
    pub fn column_index(&self, col: ColId) -> Option<usize> {
        self.columns.iter().position(|&c| c == col)
    }

    /// Returns a whole column.
    pub fn column(&self, col: ColId) -> Option<&[Value]> {
        let ci = self.column_index(col)?;
        self.data.get(ci).map(Vec::as_slice)
    }

    /// Gets a value for a row/col if both exist.
    pub fn value(&self, row: usize, col: ColId) -> Option<&Value> {
        let ci = self.column_index(col)?;
        self.data.get(ci)?.get(row)
    }

    /// Gets a numeric value for a row/col if both exist and the value is a number.
    pub fn f64(&self, row: usize, col: ColId) -> Option<f64> {
        self.value(row, col)?.as_f64()
    }

    /// Returns a frame with the given rows (by index, in the given order) and columns.
    pub(crate) fn select(&self, rows: &[usize], columns: &[ColId]) -> Self {
        let data = columns
            .iter()
            .map(|&c| match self.column(c) {
                Some(col) => rows.iter().map(|&r| col[r].clone()).collect(),
                None => alloc::vec![Value::Null; rows.len()],
            })
            .collect();
        Self {
            row_keys: rows.iter().map(|&r| self.row_keys[r]).collect(),
            columns: columns.to_vec(),
            data,
        }
    }

    /// Converts this frame into a `chartdata_core::Table` with an owned `TableData` accessor.
    pub fn into_table(self, id: TableId) -> Table {
        Table {
            id,
            version: 1,
            row_keys: self.row_keys,
            data: Some(Box::new(FrameData {
                columns: self.columns,
                data: self.data,
            })),
        }
    }
}

#[derive(Debug)]
struct FrameData {
    columns: Vec<ColId>,
    data: Vec<Vec<Value>>,
}

impl TableData for FrameData {
    fn row_count(&self) -> usize {
        self.data.first().map_or(0, |c| c.len())
    }

    fn value(&self, row: usize, col: ColId) -> Option<Value> {
        let idx = self.columns.iter().position(|&c| c == col)?;
        self.data.get(idx)?.get(row).cloned()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn from_columns_rejects_ragged_input() {
        let err = TableFrame::from_columns(vec![
            (ColId(0), vec![Value::from(1.0)]),
            (ColId(1), vec![]),
        ])
        .unwrap_err();
        assert_eq!(err, TableFrameError::RaggedColumn(ColId(1)));
        assert_eq!(
            TableFrame::from_columns(vec![]).unwrap_err(),
            TableFrameError::EmptyColumns
        );
        assert_eq!(
            TableFrame::new(vec![]).unwrap_err(),
            TableFrameError::EmptyColumns
        );
        assert_eq!(TableFrame::new(vec![ColId(0)]).unwrap().row_count(), 0);
    }

    #[test]
    fn round_trips_through_a_core_table() {
        let frame = TableFrame::from_columns(vec![
            (ColId(3), vec![Value::from(1.0), Value::from("a")]),
        ])
        .unwrap();
        let table = frame.clone().into_table(TableId(9));
        assert_eq!(table.row_keys, vec![0, 1]);
        let back = TableFrame::from_table(&table, vec![ColId(3), ColId(4)]).unwrap();
        assert_eq!(back.f64(0, ColId(3)), Some(1.0));
        assert_eq!(back.value(1, ColId(3)), Some(&Value::from("a")));
        assert_eq!(back.value(0, ColId(4)), Some(&Value::Null));
    }
}
