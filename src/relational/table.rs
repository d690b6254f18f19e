use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Decomposition output, keyed by table name
pub type Tables = BTreeMap<String, Table>;

/// Foreign key from a table to the table it was exploded out of
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentLink {
    /// Name of the parent table
    pub table: String,

    /// Column present in both tables; the parent's surrogate key
    pub column: String,
}

/// A flat relation produced by decomposition
///
/// Every row has exactly one value per column, `Value::Null` where the
/// record had nothing at that path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,

    /// Surrogate key column, present when child tables reference this one
    pub key: Option<String>,

    pub parent: Option<ParentLink>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// The value in `row` under `column`.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Every value in one column, top to bottom.
    pub fn column_values(&self, column: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(column)?;
        Some(self.rows.iter().map(|r| &r[index]).collect())
    }

    /// Rows as JSON objects with keys in column order.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}
