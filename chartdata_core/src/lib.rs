// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core data model for chart dataset aggregation.
//!
//! This crate owns the shapes that sit on either side of an aggregation pass:
//! - **Records** ([`Record`], [`Value`]) as loaded from an embedded constant or a one-time fetch,
//! - **Tables** ([`Table`], [`TableData`]) as columnar accessors keyed by [`ColId`], and
//! - a caller-owned [`Scene`] that holds the tables for one view.
//!
//! Nothing here is global: a view creates its own `Scene`, loads records into it once, and
//! passes them immutably into the transforms in `chartdata_transforms`.

#![no_std]

extern crate alloc;

mod record;
mod scene;
mod table;
mod value;

pub use record::{Record, RecordTable, Schema};
pub use scene::Scene;
pub use table::{ColId, Table, TableData, TableId};
pub use value::{GroupKey, Value, year_of_epoch_seconds};
