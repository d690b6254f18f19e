use serde::Serialize;
use std::fmt;

/// A location in a document: the sequence of mapping keys leading to a value.
///
/// Paths are compared segment by segment, so a key that happens to contain the
/// delimiter never collides with a nested path. The delimiter only matters when
/// a path is rendered or parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Build a path from its segments. An empty sequence is the document root,
    /// which never appears in a discovery result.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldPath(segments.into_iter().map(Into::into).collect())
    }

    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    /// Parse a rendered path. The empty string is the single empty key, so
    /// `{"": 1}` stays addressable.
    pub fn parse(rendered: &str, delimiter: &str) -> Self {
        if delimiter.is_empty() {
            return FieldPath(vec![rendered.to_string()]);
        }
        FieldPath(rendered.split(delimiter).map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// The path one level below this one.
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        FieldPath(segments)
    }

    /// The first `len` segments of this path.
    pub fn prefix(&self, len: usize) -> Self {
        FieldPath(self.0[..len.min(self.0.len())].to_vec())
    }

    /// True if `other` is a segment-wise prefix of `self` (or equal to it).
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        self.0.starts_with(&other.0)
    }

    pub fn is_strict_prefix_of(&self, other: &FieldPath) -> bool {
        self.0.len() < other.0.len() && other.starts_with(self)
    }

    pub fn render(&self, delimiter: &str) -> String {
        self.0.join(delimiter)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(DEFAULT_DELIMITER))
    }
}

pub const DEFAULT_DELIMITER: &str = ".";

/// Configuration shared by discovery rendering and decomposition
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Delimiter used to render paths into column and table names
    pub delimiter: String,

    /// Name of the table built from the document root
    pub root_table: String,

    /// Suffix appended to a table name to form its surrogate key column
    pub key_suffix: String,
}

impl ExplorerConfig {
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_root_table(mut self, name: impl Into<String>) -> Self {
        self.root_table = name.into();
        self
    }

    pub fn with_key_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.key_suffix = suffix.into();
        self
    }

    /// Surrogate key column name for `table`, e.g. `main_ID`.
    pub fn key_column(&self, table: &str) -> String {
        format!("{}{}", table, self.key_suffix)
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        ExplorerConfig {
            delimiter: String::from(DEFAULT_DELIMITER),
            root_table: String::from("main"),
            key_suffix: String::from("_ID"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let path = FieldPath::parse("order/lines/sku", "/");
        assert_eq!(path.depth(), 3);
        assert_eq!(path.render("."), "order.lines.sku");
        assert_eq!(path.to_string(), "order.lines.sku");

        assert_eq!(FieldPath::parse("", "."), FieldPath::new([""]));
        assert_eq!(FieldPath::parse("a..b", "."), FieldPath::new(["a", "", "b"]));
    }

    #[test]
    fn test_prefix_is_segment_wise() {
        let items = FieldPath::new(["items"]);
        let nested = FieldPath::new(["items", "x"]);
        let lookalike = FieldPath::new(["items2", "x"]);

        assert!(items.is_strict_prefix_of(&nested));
        assert!(!items.is_strict_prefix_of(&lookalike));
        assert!(!items.is_strict_prefix_of(&items));
        assert!(nested.starts_with(&items));
    }

    #[test]
    fn test_keys_containing_delimiter_stay_distinct() {
        let dotted = FieldPath::new(["a.b"]);
        let nested = FieldPath::new(["a", "b"]);
        assert_ne!(dotted, nested);
        assert_eq!(dotted.render("."), nested.render("."));
    }

    #[test]
    fn test_default_config() {
        let config = ExplorerConfig::default();
        assert_eq!(config.delimiter, ".");
        assert_eq!(config.key_column("main"), "main_ID");

        let config = config.with_root_table("root").with_key_suffix("_fk");
        assert_eq!(config.key_column(&config.root_table), "root_fk");
    }
}
