//! A loaded document together with everything derived from it
//!
//! Paths are discovered once when the document is built. Field summaries are
//! computed on first request and cached for the lifetime of the document.

use crate::discovery::{discover, Discovery};
use crate::error::{Error, Result};
use crate::relational::{decompose, Tables};
use crate::sample;
use crate::summary::{FieldSummarizer, FieldSummary};
use crate::types::{ExplorerConfig, FieldPath};
use crate::value::{is_mapping_sequence, Shape};
use once_cell::unsync::OnceCell;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Something `consistency_check` found worth a second look
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsistencyIssue {
    /// The field is absent or null in some records
    Missing { field: String, na_fraction: f64 },
    /// Present values do not share one type
    MixedTypes { field: String, types: Vec<String> },
}

pub struct Document {
    tree: Value,
    config: ExplorerConfig,
    discovery: Discovery,
    summaries: BTreeMap<FieldPath, OnceCell<FieldSummary>>,
}

impl Document {
    pub fn from_value(tree: Value) -> Self {
        Self::with_config(tree, ExplorerConfig::default())
    }

    pub fn with_config(tree: Value, config: ExplorerConfig) -> Self {
        let discovery = discover(&tree);
        let summaries = discovery
            .fields
            .iter()
            .map(|path| (path.clone(), OnceCell::new()))
            .collect();

        Document {
            tree,
            config,
            discovery,
            summaries,
        }
    }

    /// Parse a single JSON document from `reader`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let tree: Value = serde_json::from_reader(reader)?;
        Ok(Self::from_value(tree))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Loading document");
        Self::from_reader(BufReader::new(file))
    }

    /// Parse newline-delimited JSON, one record per non-blank line. The
    /// records form a top-level sequence.
    pub fn from_ndjson<R: BufRead>(reader: R) -> Result<Self> {
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value = serde_json::from_str(line).map_err(|source| Error::ParseLine {
                line: index + 1,
                source,
            })?;
            records.push(value);
        }

        Ok(Self::from_value(Value::Array(records)))
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn discovery(&self) -> &Discovery {
        &self.discovery
    }

    pub fn fields(&self) -> &BTreeSet<FieldPath> {
        &self.discovery.fields
    }

    pub fn arrays(&self) -> &BTreeSet<FieldPath> {
        &self.discovery.arrays
    }

    /// Field paths rendered with `delimiter`, sorted lexicographically.
    pub fn list_fields(&self, delimiter: &str) -> Vec<String> {
        self.discovery.list_fields(delimiter)
    }

    /// Parse a rendered field name using the configured delimiter.
    pub fn field_path(&self, field: &str) -> Result<FieldPath> {
        let path = FieldPath::parse(field, &self.config.delimiter);
        if self.discovery.is_field(&path) {
            Ok(path)
        } else {
            Err(Error::UnknownField(field.to_string()))
        }
    }

    /// Summary of a rendered field name.
    pub fn summary(&self, field: &str) -> Result<&FieldSummary> {
        let path = self.field_path(field)?;
        self.summary_of(&path)
    }

    pub fn summary_of(&self, path: &FieldPath) -> Result<&FieldSummary> {
        let cell = self
            .summaries
            .get(path)
            .ok_or_else(|| Error::UnknownField(path.render(&self.config.delimiter)))?;

        cell.get_or_try_init(|| FieldSummarizer::new(&self.tree, &self.discovery).summarize(path))
    }

    /// Every field with its summary, in path order.
    pub fn summaries(&self) -> Result<Vec<(&FieldPath, &FieldSummary)>> {
        let mut all = Vec::with_capacity(self.discovery.fields.len());
        for path in &self.discovery.fields {
            all.push((path, self.summary_of(path)?));
        }
        Ok(all)
    }

    /// Number of records at the root: one for a mapping, one per mapping of
    /// a top-level sequence of mappings.
    pub fn num_entries(&self) -> usize {
        match &self.tree {
            Value::Object(_) => 1,
            Value::Array(items) if is_mapping_sequence(&self.tree) => {
                items.iter().filter(|v| v.is_object()).count()
            }
            Value::Array(_) => 0,
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => 0,
        }
    }

    /// Missing fraction per rendered field.
    pub fn na_report(&self) -> Result<BTreeMap<String, f64>> {
        Ok(self
            .summaries()?
            .into_iter()
            .map(|(path, summary)| (self.render(path), summary.na_fraction))
            .collect())
    }

    /// Fields that are not present everywhere or whose values disagree on
    /// type. Type checks look at every present value, not only the first.
    pub fn consistency_check(&self) -> Result<Vec<ConsistencyIssue>> {
        let mut issues = Vec::new();

        for (path, summary) in self.summaries()? {
            let field = self.render(path);

            if summary.missing > 0 {
                issues.push(ConsistencyIssue::Missing {
                    field: field.clone(),
                    na_fraction: summary.na_fraction,
                });
            }

            let types: BTreeSet<&'static str> = summary
                .sample
                .iter()
                .map(|value| Shape::of(value).type_name())
                .collect();
            if types.len() > 1 {
                issues.push(ConsistencyIssue::MixedTypes {
                    field,
                    types: types.into_iter().map(str::to_string).collect(),
                });
            }
        }

        Ok(issues)
    }

    /// Up to `k` preview values per rendered field.
    pub fn get_sample(&self, k: usize, unique: bool) -> Result<BTreeMap<String, Vec<Value>>> {
        Ok(self
            .summaries()?
            .into_iter()
            .map(|(path, summary)| (self.render(path), sample::take(&summary.sample, k, unique)))
            .collect())
    }

    pub fn decompose(&self) -> Result<Tables> {
        decompose(&self.tree, &self.discovery, &self.config)
    }

    fn render(&self, path: &FieldPath) -> String {
        path.render(&self.config.delimiter)
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tree: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(tree))
    }
}
