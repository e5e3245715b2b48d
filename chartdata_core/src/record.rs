// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat records and the schema that maps their field names onto column ids.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::{ColId, GroupKey, TableData, Value};

/// A flat record: field name to value.
///
/// Records are loaded once and then treated as immutable input to aggregation passes.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a numeric field, or `NaN` if it is missing or not a number.
    ///
    /// `NaN` is what aggregation passes skip, so this is the usual way to write a value
    /// accessor: `|r: &Record| r.num("Rating")`.
    pub fn num(&self, name: &str) -> f64 {
        self.get(name).and_then(Value::as_f64).unwrap_or(f64::NAN)
    }

    /// Returns a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Derives a group key from a field.
    pub fn key(&self, name: &str) -> Option<GroupKey> {
        self.get(name).and_then(GroupKey::from_value)
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Column names for a table, indexed by [`ColId`].
///
/// Output field names are configuration: transforms only ever see column ids, and a schema
/// decides what those ids are called when rows leave the aggregation layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schema from names, assigning ids in order.
    pub fn from_names<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        let mut schema = Self::new();
        for name in names {
            schema.push(name);
        }
        schema
    }

    /// Returns the id for `name`, adding it if it is not present yet.
    pub fn push(&mut self, name: impl Into<String>) -> ColId {
        let name = name.into();
        if let Some(col) = self.col(&name) {
            return col;
        }
        self.names.push(name);
        Self::id_at(self.names.len() - 1)
    }

    /// Looks up a column id by name.
    pub fn col(&self, name: &str) -> Option<ColId> {
        self.names.iter().position(|n| n == name).map(Self::id_at)
    }

    /// Looks up a column name by id.
    pub fn name(&self, col: ColId) -> Option<&str> {
        self.names.get(col.0 as usize).map(String::as_str)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ColId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (Self::id_at(i), n.as_str()))
    }

    fn id_at(index: usize) -> ColId {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "schemas hold far fewer than 2^32 columns"
        )]
        let id = index as u32;
        ColId(id)
    }
}

/// Records exposed as a columnar table through a [`Schema`].
#[derive(Clone, Debug, Default)]
pub struct RecordTable {
    /// Column names.
    pub schema: Schema,
    /// Rows.
    pub records: Vec<Record>,
}

impl RecordTable {
    /// Creates a table over `records` with an explicit schema.
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Creates a table whose schema is every field name seen in `records`, sorted by name.
    pub fn infer(records: Vec<Record>) -> Self {
        let mut names: Vec<&str> = records
            .iter()
            .flat_map(|r| r.fields.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.dedup();
        let schema = Schema::from_names(names);
        Self { schema, records }
    }
}

impl TableData for RecordTable {
    fn row_count(&self) -> usize {
        self.records.len()
    }

    fn value(&self, row: usize, col: ColId) -> Option<Value> {
        let record = self.records.get(row)?;
        let name = self.schema.name(col)?;
        Some(record.get(name).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn num_is_nan_for_missing_or_text_fields() {
        let r = Record::new().with("year", 2005_i64).with("name", "Katrina");
        assert_eq!(r.num("year"), 2005.0);
        assert!(r.num("name").is_nan());
        assert!(r.num("missing").is_nan());
        assert_eq!(r.text("name"), Some("Katrina"));
    }

    #[test]
    fn schema_push_is_idempotent_per_name() {
        let mut schema = Schema::new();
        let a = schema.push("bin_start");
        let b = schema.push("count");
        assert_eq!(schema.push("bin_start"), a);
        assert_eq!(schema.name(b), Some("count"));
        assert_eq!(schema.len(), 2);
    }

    #[test]
    fn inferred_table_reports_missing_fields_as_null() {
        let table = RecordTable::infer(vec![
            Record::new().with("a", 1.0).with("b", 2.0),
            Record::new().with("a", 3.0),
        ]);
        let a = table.schema.col("a").unwrap();
        let b = table.schema.col("b").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.f64(1, a), Some(3.0));
        assert_eq!(table.value(1, b), Some(Value::Null));
        assert_eq!(table.f64(1, b), None);
        assert_eq!(table.value(2, a), None);
    }
}
