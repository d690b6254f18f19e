//! Working representation of a table while decomposition is in progress.
//!
//! Data columns are identified by their [`FieldPath`] rather than by a
//! rendered name, so expansion and ownership checks never depend on the
//! delimiter. Names are only rendered when the frame becomes a [`Table`].

use crate::relational::table::{ParentLink, Table};
use crate::types::FieldPath;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Column {
    /// Values found at a document path
    Field(FieldPath),
    /// A generated key column (own surrogate key or a parent's key)
    Generated(String),
}

impl Column {
    fn render(&self, delimiter: &str) -> String {
        match self {
            Column::Field(path) => path.render(delimiter),
            Column::Generated(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Frame {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
    pub key: Option<String>,
    pub parent: Option<ParentLink>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Frame {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            key: None,
            parent: None,
        }
    }

    /// One row per record, one column per top-level key in first-seen order.
    pub fn from_records<'a, I>(name: impl Into<String>, records: I) -> Self
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let records: Vec<&Map<String, Value>> = records.into_iter().collect();
        let mut frame = Frame::new(name);

        let mut keys: Vec<&String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }

        frame.columns = keys
            .iter()
            .map(|key| Column::Field(FieldPath::new([key.as_str()])))
            .collect();
        frame.rows = records
            .iter()
            .map(|record| {
                keys.iter()
                    .map(|key| record.get(key.as_str()).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        frame
    }

    /// True if any column, data or generated, renders to `name`.
    pub fn has_column_named(&self, name: &str, delimiter: &str) -> bool {
        self.columns.iter().any(|c| c.render(delimiter) == name)
    }

    pub fn position(&self, path: &FieldPath) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| matches!(c, Column::Field(p) if p == path))
    }

    #[cfg(test)]
    pub fn field_paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.columns.iter().filter_map(|c| match c {
            Column::Field(path) => Some(path),
            Column::Generated(_) => None,
        })
    }

    pub fn insert_column(&mut self, index: usize, column: Column, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.insert(index, column);
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(index, value);
        }
    }

    pub fn push_column(&mut self, column: Column, values: Vec<Value>) {
        let index = self.columns.len();
        self.insert_column(index, column, values);
    }

    pub fn remove_column(&mut self, index: usize) -> Vec<Value> {
        self.columns.remove(index);
        self.rows.iter_mut().map(|row| row.remove(index)).collect()
    }

    /// Column values at `index`, leaving nulls behind.
    pub fn take_column(&mut self, index: usize) -> Vec<Value> {
        self.rows
            .iter_mut()
            .map(|row| std::mem::take(&mut row[index]))
            .collect()
    }

    /// Values of this frame's surrogate key, adding a positional key column
    /// named `key_name` on first use.
    pub fn ensure_key(&mut self, key_name: &str) -> Vec<Value> {
        let existing = self.key.as_ref().and_then(|key| {
            self.columns
                .iter()
                .position(|c| matches!(c, Column::Generated(name) if name == key))
        });

        let index = match existing {
            Some(index) => index,
            None => {
                let keys = (0..self.rows.len()).map(Value::from).collect();
                self.push_column(Column::Generated(key_name.to_string()), keys);
                self.key = Some(key_name.to_string());
                self.columns.len() - 1
            }
        };

        self.rows.iter().map(|row| row[index].clone()).collect()
    }

    /// Render column names. Distinct paths that render alike (a key holding
    /// the delimiter next to a nested path) get numbered suffixes, first
    /// occurrence keeps the plain name.
    pub fn into_table(self, delimiter: &str) -> Table {
        let rendered: Vec<String> = self.columns.iter().map(|c| c.render(delimiter)).collect();
        let mut columns: Vec<String> = Vec::with_capacity(rendered.len());

        for name in &rendered {
            let name = if columns.contains(name) {
                unique_name(name, |candidate| {
                    columns.iter().chain(&rendered).any(|taken| taken == candidate)
                })
            } else {
                name.clone()
            };
            columns.push(name);
        }

        Table {
            name: self.name,
            columns,
            rows: self.rows,
            key: self.key,
            parent: self.parent,
        }
    }
}

/// `base`, or the first of `base_2`, `base_3`, ... that is not `taken`.
pub(crate) fn unique_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2usize..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken(candidate.as_str()))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_records_unions_keys() {
        let a = json!({"a": 1});
        let b = json!({"b": 2, "a": 3});
        let records = [a.as_object().unwrap(), b.as_object().unwrap()];

        let frame = Frame::from_records("main", records);
        assert_eq!(
            frame.columns,
            vec![
                Column::Field(FieldPath::new(["a"])),
                Column::Field(FieldPath::new(["b"]))
            ]
        );
        assert_eq!(frame.rows, vec![vec![json!(1), Value::Null], vec![json!(3), json!(2)]]);
    }

    #[test]
    fn test_ensure_key_is_stable() {
        let record = json!({"a": 1});
        let mut frame = Frame::from_records("main", [record.as_object().unwrap()]);

        assert_eq!(frame.ensure_key("main_ID"), vec![json!(0)]);
        assert_eq!(frame.ensure_key("main_ID"), vec![json!(0)]);
        assert_eq!(frame.columns.len(), 2);

        let table = frame.into_table(".");
        assert_eq!(table.columns, vec!["a", "main_ID"]);
        assert_eq!(table.key.as_deref(), Some("main_ID"));
    }

    #[test]
    fn test_unique_name() {
        let taken = ["main", "main_2"];
        assert_eq!(unique_name("items", |n| taken.contains(&n)), "items");
        assert_eq!(unique_name("main", |n| taken.contains(&n)), "main_3");
    }

    #[test]
    fn test_lookalike_columns_get_distinct_names() {
        let mut frame = Frame::new("main");
        frame.columns = vec![
            Column::Field(FieldPath::new(["a.b"])),
            Column::Field(FieldPath::new(["a", "b"])),
            Column::Generated("main_ID".to_string()),
        ];
        frame.rows = vec![vec![json!(1), json!(2), json!(0)]];
        assert!(frame.has_column_named("a.b", "."));
        assert!(frame.has_column_named("main_ID", "."));

        let table = frame.into_table(".");
        assert_eq!(table.columns, vec!["a.b", "a.b_2", "main_ID"]);
        assert_eq!(table.records()[0]["a.b_2"], json!(2));
    }
}
