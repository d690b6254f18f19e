//! Relational decomposition - split a document into flat, linked tables
//!
//! Every array path (a sequence of mappings) becomes its own table, linked to
//! the table it was exploded out of by a generated surrogate key. Nested
//! mappings are flattened into one column per leaf within a table.

pub mod decompose;
mod expand;
mod frame;
pub mod table;
pub mod writer;

pub use decompose::{decompose, RelationalDecomposer};
pub use table::{ParentLink, Table, Tables};
pub use writer::{SingleWriter, TableWriter};
