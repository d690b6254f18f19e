//! Relational decomposition
//!
//! Splits a document into one table per array path plus a root table. Array
//! paths are handled deepest first: field ownership is assigned from the
//! innermost array outwards, and explosion always picks the deepest pending
//! array path that is already present as a column of some table. An array
//! column is therefore only exploded out of the table that directly contains
//! it, and a child table never needs columns from further up.

use crate::discovery::Discovery;
use crate::error::{Error, Result};
use crate::relational::expand::TableExpander;
use crate::relational::frame::{unique_name, Column, Frame};
use crate::relational::table::{ParentLink, Tables};
use crate::types::{ExplorerConfig, FieldPath};
use crate::value::is_mapping_sequence;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace, warn};

/// Decompose `tree` into linked flat tables.
pub fn decompose(tree: &Value, discovery: &Discovery, config: &ExplorerConfig) -> Result<Tables> {
    RelationalDecomposer::new(discovery, config).decompose(tree)
}

/// Builds the table set for one document
///
/// Table names are the rendered array paths. A name already taken by the root
/// table or by an earlier array path gets a numbered suffix (`main_2`).
/// Surrogate key columns likewise step around any rendered document path.
pub struct RelationalDecomposer<'a> {
    discovery: &'a Discovery,
    config: &'a ExplorerConfig,
    table_names: BTreeMap<FieldPath, String>,
    reserved: BTreeSet<String>,
}

impl<'a> RelationalDecomposer<'a> {
    pub fn new(discovery: &'a Discovery, config: &'a ExplorerConfig) -> Self {
        let mut used = vec![config.root_table.clone()];
        let mut table_names = BTreeMap::new();
        for array in &discovery.arrays {
            let name = unique_name(&array.render(&config.delimiter), |candidate| {
                used.iter().any(|name| name == candidate)
            });
            used.push(name.clone());
            table_names.insert(array.clone(), name);
        }

        let reserved = discovery
            .fields
            .iter()
            .chain(&discovery.arrays)
            .map(|path| path.render(&config.delimiter))
            .collect();

        RelationalDecomposer {
            discovery,
            config,
            table_names,
            reserved,
        }
    }

    /// Name of the table built for `array`.
    pub fn table_name(&self, array: &FieldPath) -> String {
        self.table_names
            .get(array)
            .cloned()
            .unwrap_or_else(|| array.render(&self.config.delimiter))
    }

    /// The owner's surrogate key column: its existing key, or
    /// `<table><suffix>` unless a column or document path already renders to
    /// that name.
    fn key_name(&self, owner: &Frame) -> String {
        if let Some(key) = &owner.key {
            return key.clone();
        }
        unique_name(&self.config.key_column(&owner.name), |candidate| {
            self.reserved.contains(candidate)
                || owner.has_column_named(candidate, &self.config.delimiter)
        })
    }

    /// Assign every discovered field to the table that will hold it.
    ///
    /// Each array path, deepest first, claims the remaining fields below it;
    /// whatever is left belongs to the root table.
    pub fn partition(&self) -> BTreeMap<String, Vec<FieldPath>> {
        let mut remaining: Vec<&FieldPath> = self.discovery.fields.iter().collect();
        let mut owned = BTreeMap::new();

        for array in self.discovery.arrays_deepest_first() {
            let (claimed, rest): (Vec<&FieldPath>, Vec<&FieldPath>) = remaining
                .into_iter()
                .partition(|field| array.is_strict_prefix_of(field));
            remaining = rest;
            owned.insert(
                self.table_name(array),
                claimed.into_iter().cloned().collect(),
            );
        }

        owned.insert(
            self.config.root_table.clone(),
            remaining.into_iter().cloned().collect(),
        );
        owned
    }

    pub fn decompose(&self, tree: &Value) -> Result<Tables> {
        let expander = TableExpander::new(&self.discovery.arrays);

        let root = Frame::from_records(self.config.root_table.clone(), root_records(tree));
        let mut frames = vec![expander.expand(root, None)];

        let mut pending = self.discovery.arrays_deepest_first();
        while !pending.is_empty() {
            let (slot, owner, column) = self.locate(&pending, &frames)?;
            let array = pending.remove(slot);

            let child = self.explode(&mut frames[owner], column, array);
            frames.push(expander.expand(child, Some(array)));
        }

        let mut ownership = self.partition();
        let mut tables = Tables::new();

        for mut frame in frames {
            // Fields that never materialised in any row still get a column
            for field in ownership.remove(&frame.name).unwrap_or_default() {
                if frame.position(&field).is_none() {
                    let nulls = vec![Value::Null; frame.rows.len()];
                    frame.push_column(Column::Field(field), nulls);
                }
            }

            let table = frame.into_table(&self.config.delimiter);
            if tables.contains_key(&table.name) {
                return Err(Error::DecompositionIntegrity(format!(
                    "table name {} is produced twice",
                    table.name
                )));
            }
            tables.insert(table.name.clone(), table);
        }

        debug!(
            tables = tables.len(),
            rows = tables.values().map(|t| t.len()).sum::<usize>(),
            "Decomposed document"
        );
        Ok(tables)
    }

    /// The first pending array path, in deepest-first order, that is a
    /// column of a live frame: `(pending slot, frame index, column index)`.
    fn locate(&self, pending: &[&FieldPath], frames: &[Frame]) -> Result<(usize, usize, usize)> {
        for (slot, array) in pending.iter().enumerate() {
            for (owner, frame) in frames.iter().enumerate() {
                if let Some(column) = frame.position(array) {
                    return Ok((slot, owner, column));
                }
            }
        }

        let missing: Vec<String> = pending.iter().map(|p| self.table_name(p)).collect();
        Err(Error::DecompositionIntegrity(format!(
            "array paths not found in any table: {}",
            missing.join(", ")
        )))
    }

    /// Move the array column out of `owner` into a new table with one row
    /// per element, linked back through the owner's surrogate key.
    fn explode(&self, owner: &mut Frame, column: usize, array: &FieldPath) -> Frame {
        let key_name = self.key_name(owner);
        let keys = owner.ensure_key(&key_name);
        let values = owner.remove_column(column);

        let mut child = Frame::new(self.table_name(array));
        child.columns = vec![
            Column::Field(array.clone()),
            Column::Generated(key_name.clone()),
        ];
        child.parent = Some(ParentLink {
            table: owner.name.clone(),
            column: key_name,
        });

        for (value, key) in values.into_iter().zip(keys) {
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for item in items {
                        child.rows.push(vec![item, key.clone()]);
                    }
                }
                // A lone value where a sequence was expected explodes to one row
                other => child.rows.push(vec![other, key]),
            }
        }

        trace!(
            table = %child.name,
            parent = %owner.name,
            rows = child.rows.len(),
            "Exploded array column"
        );
        child
    }
}

/// Records making up the root table: the document itself, or each mapping
/// of a top-level sequence whose first element is a mapping.
fn root_records(tree: &Value) -> Vec<&Map<String, Value>> {
    match tree {
        Value::Object(map) => vec![map],
        Value::Array(items) if is_mapping_sequence(tree) => {
            let records: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();
            if records.len() < items.len() {
                warn!(
                    skipped = items.len() - records.len(),
                    "Ignoring non-mapping elements of top-level sequence"
                );
            }
            records
        }
        Value::Array(items) => {
            if !items.is_empty() {
                warn!(
                    skipped = items.len(),
                    "Top-level sequence does not start with a mapping, no records"
                );
            }
            Vec::new()
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Vec::new(),
    }
}
