//! # json-explorer - schema discovery and relational decomposition for JSON
//!
//! Walks an arbitrary JSON document, discovers every field path and every
//! array path (where one record fans out into many), summarizes each field,
//! and splits the document into flat tables linked by generated keys.
//!
//! ## Modules
//!
//! - **discovery**: field and array paths of a document
//! - **summary**: per-field count, missing fraction, type and value pool
//! - **relational**: one table per array path, linked by surrogate keys
//! - **document**: a loaded document with cached summaries
//!
//! ## Quick Start
//!
//! ```rust
//! use json_explorer::Document;
//! use serde_json::json;
//!
//! # fn main() -> json_explorer::Result<()> {
//! let doc = Document::from_value(json!({
//!     "id": 1,
//!     "author": {"name": "Alice"},
//!     "posts": [
//!         {"title": "First Post"},
//!         {"title": "Second Post"}
//!     ]
//! }));
//!
//! assert_eq!(doc.list_fields("."), vec!["author.name", "id", "posts.title"]);
//! assert_eq!(doc.summary("posts.title")?.count, 2);
//!
//! let tables = doc.decompose()?;
//! // tables["main"]  = id, author.name, main_ID
//! // tables["posts"] = posts.title, main_ID
//! assert_eq!(tables["posts"].len(), 2);
//! # Ok(())
//! # }
//! ```

use std::io::Read;

pub mod discovery;
pub mod document;
pub mod error;
pub mod format;
pub mod relational;
pub mod sample;
pub mod summary;
pub mod types;
pub mod value;

// Re-export commonly used types for convenience
pub use discovery::{discover, Discovery};
pub use document::{ConsistencyIssue, Document};
pub use error::{Error, Result};
pub use format::Format;
pub use relational::{decompose, ParentLink, RelationalDecomposer, SingleWriter, Table, TableWriter, Tables};
pub use summary::{summarize, FieldSummarizer, FieldSummary};
pub use types::{ExplorerConfig, FieldPath};
pub use value::{Shape, ValueTree};

/// Main entry point: parse one JSON document and decompose it into tables
pub fn decompose_json<R: Read>(reader: R, config: ExplorerConfig) -> Result<Tables> {
    let tree: ValueTree = serde_json::from_reader(reader)?;
    let discovery = discover(&tree);
    decompose(&tree, &discovery, &config)
}
