// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Columnar table accessors.

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::Value;

/// Identifies a table within a [`Scene`](crate::Scene).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(pub u64);

/// Identifies a column. Column names live in a [`Schema`](crate::Schema), not in the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColId(pub u32);

/// Row/column accessor over a table's data.
pub trait TableData: Debug {
    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Returns the value at `row`/`col`, or `None` if the row or column does not exist.
    fn value(&self, row: usize, col: ColId) -> Option<Value>;

    /// Returns the numeric value at `row`/`col`, if it exists and is a number.
    fn f64(&self, row: usize, col: ColId) -> Option<f64> {
        self.value(row, col).and_then(|v| v.as_f64())
    }
}

/// A versioned table: stable row keys plus an optional data accessor.
#[derive(Debug)]
pub struct Table {
    /// Table id.
    pub id: TableId,
    /// Bumped whenever `row_keys` or `data` are replaced.
    pub version: u64,
    /// Stable identity for each row.
    pub row_keys: Vec<u64>,
    /// Data accessor, if loaded.
    pub data: Option<Box<dyn TableData>>,
}

impl Table {
    /// Creates an empty table with no data.
    pub fn new(id: TableId) -> Self {
        Self {
            id,
            version: 1,
            row_keys: Vec::new(),
            data: None,
        }
    }

    /// Creates a table from a data accessor, keying rows by index.
    pub fn from_data(id: TableId, data: Box<dyn TableData>) -> Self {
        let row_keys = (0..data.row_count() as u64).collect();
        Self {
            id,
            version: 1,
            row_keys,
            data: Some(data),
        }
    }

    /// Marks the table as changed.
    pub fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Number of rows (by row keys).
    pub fn row_count(&self) -> usize {
        self.row_keys.len()
    }
}
