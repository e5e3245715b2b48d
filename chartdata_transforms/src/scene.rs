// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Convenience execution helpers for running transforms against a `chartdata_core::Scene`.
//!
//! View code shouldn't have to manually extract `TableFrame`s, run `Program::execute`, and then
//! re-insert output tables.

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;

use chartdata_core::{ColId, Scene, Table, TableId};
use hashbrown::hash_map::Entry;
use hashbrown::{HashMap, HashSet};

use crate::Program;
use crate::program::{ExecutionError, ProgramOutput};
use crate::table::{TableFrame, TableFrameError};
use crate::transform::Transform;

/// Errors returned when executing a [`Program`] against a [`Scene`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneExecutionError {
    /// The referenced input table does not exist in the scene.
    MissingInput(TableId),
    /// The referenced input table exists, but has no data accessor.
    MissingData(TableId),
    /// Failed to extract a frame from an input table.
    FrameError {
        /// The table id that failed frame extraction.
        table: TableId,
        /// The underlying extraction error.
        err: TableFrameError,
    },
    /// Failed while executing the program.
    Execution(ExecutionError),
}

impl fmt::Display for SceneExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(id) => write!(f, "scene has no table {}", id.0),
            Self::MissingData(id) => write!(f, "table {} has no data loaded", id.0),
            Self::FrameError { table, err } => write!(f, "table {}: {err}", table.0),
            Self::Execution(err) => err.fmt(f),
        }
    }
}

impl core::error::Error for SceneExecutionError {}

impl From<ExecutionError> for SceneExecutionError {
    fn from(err: ExecutionError) -> Self {
        Self::Execution(err)
    }
}

impl Program {
    /// Execute this program using tables from the given scene.
    ///
    /// This extracts the required columns into `TableFrame`s and runs the program in
    /// full-recompute mode. The returned output contains owned tables (`TableFrame`) keyed by
    /// their output ids.
    pub fn execute_on_scene(&self, scene: &Scene) -> Result<ProgramOutput, SceneExecutionError> {
        let required = required_input_columns(self.transforms());
        let mut inputs: HashMap<TableId, TableFrame> = HashMap::new();

        for (table_id, cols) in required {
            let Some(table) = scene.tables.get(&table_id) else {
                return Err(SceneExecutionError::MissingInput(table_id));
            };
            if table.data.is_none() {
                return Err(SceneExecutionError::MissingData(table_id));
            }
            let mut columns: Vec<ColId> = cols.into_iter().collect();
            columns.sort_unstable();
            let frame = TableFrame::from_table(table, columns).map_err(|err| {
                SceneExecutionError::FrameError {
                    table: table_id,
                    err,
                }
            })?;
            inputs.insert(table_id, frame);
        }

        Ok(self.execute(&inputs)?)
    }

    /// Execute this program against the scene, inserting/updating output tables.
    ///
    /// Output tables are inserted if missing. If a table exists, its `row_keys` and `data` are
    /// replaced and its version is bumped once.
    pub fn apply_to_scene(&self, scene: &mut Scene) -> Result<ProgramOutput, SceneExecutionError> {
        let out = self.execute_on_scene(scene)?;
        for (id, frame) in &out.tables {
            upsert_frame_as_table(scene, *id, frame.clone());
        }
        Ok(out)
    }
}

/// Columns each scene table must provide, skipping tables the program produces itself.
fn required_input_columns(transforms: &[Transform]) -> HashMap<TableId, HashSet<ColId>> {
    let mut out: HashMap<TableId, HashSet<ColId>> = HashMap::new();
    let mut produced: HashSet<TableId> = HashSet::new();

    for t in transforms {
        if !produced.contains(&t.input()) {
            out.entry(t.input()).or_default().extend(t.input_columns());
        }
        produced.insert(t.output());
    }

    out
}

fn upsert_frame_as_table(scene: &mut Scene, id: TableId, frame: TableFrame) {
    match scene.tables.entry(id) {
        Entry::Occupied(mut e) => {
            let Table { data, row_keys, .. } = frame.into_table(id);
            let existing = e.get_mut();
            existing.row_keys = row_keys;
            existing.data = data;
            existing.bump();
        }
        Entry::Vacant(e) => {
            e.insert(frame.into_table(id));
        }
    }
}
