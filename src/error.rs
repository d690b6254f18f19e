use thiserror::Error;

/// Errors raised while loading, querying or decomposing a document
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse JSON document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to parse JSON on line {line}: {source}")]
    ParseLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    /// A query named a field that discovery never produced.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// The summarizer was handed a path outside the discovered field set.
    #[error("path is not a discovered field: {0}")]
    InvalidPath(String),

    /// An array path could not be located in any live table.
    #[error("decomposition integrity error: {0}")]
    DecompositionIntegrity(String),
}

pub type Result<T> = std::result::Result<T, Error>;
