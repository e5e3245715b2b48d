// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-owned table container.

use hashbrown::HashMap;

use crate::{Table, TableId};

/// The tables owned by a single view.
///
/// A view creates one `Scene`, loads its dataset once, and re-runs transforms against it when
/// its configuration changes. Scenes are never shared between views.
#[derive(Debug, Default)]
pub struct Scene {
    /// Tables by id.
    pub tables: HashMap<TableId, Table>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a table, replacing any existing table with the same id.
    pub fn insert_table(&mut self, table: Table) {
        self.tables.insert(table.id, table);
    }

    /// Returns a table by id.
    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    /// Removes a table by id.
    pub fn remove_table(&mut self, id: TableId) -> Option<Table> {
        self.tables.remove(&id)
    }
}
