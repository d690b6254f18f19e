use crate::relational::table::{Table, Tables};
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes each table to its own JSON Lines file, `<dir>/<table>.jsonl`
pub struct TableWriter {
    output_dir: PathBuf,
}

impl TableWriter {
    /// Create a writer for `output_dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Result<Self> {
        std::fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

        Ok(TableWriter {
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    pub fn path_for(&self, table: &str) -> PathBuf {
        self.output_dir.join(format!("{}.jsonl", table))
    }

    /// Write every table, replacing files from a previous run.
    /// Returns the paths written, in table name order.
    pub fn write_tables(&self, tables: &Tables) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(tables.len());

        for table in tables.values() {
            let path = self.path_for(&table.name);
            let file = File::create(&path)
                .with_context(|| format!("Failed to create file: {}", path.display()))?;

            let mut writer = BufWriter::new(file);
            write_rows(&mut writer, table)?;
            writer.flush().context("Failed to flush writer")?;

            written.push(path);
        }

        Ok(written)
    }
}

fn write_rows<W: Write>(writer: &mut W, table: &Table) -> Result<()> {
    for record in table.records() {
        let json = serde_json::to_string(&record).context("Failed to serialize row")?;
        writeln!(writer, "{}", json).context("Failed to write row")?;
    }
    Ok(())
}

/// Writes the rows of every table to a single stream, tagging each row with
/// its table and parent table
pub struct SingleWriter<W: Write> {
    writer: W,
}

impl<W: Write> SingleWriter<W> {
    pub fn new(writer: W) -> Self {
        SingleWriter { writer }
    }

    pub fn write_tables(&mut self, tables: &Tables) -> Result<()> {
        for table in tables.values() {
            for mut record in table.records() {
                record.insert("_table".to_string(), Value::String(table.name.clone()));

                if let Some(parent) = &table.parent {
                    record.insert(
                        "_parent_table".to_string(),
                        Value::String(parent.table.clone()),
                    );
                }

                let json = serde_json::to_string(&record).context("Failed to serialize row")?;
                writeln!(self.writer, "{}", json).context("Failed to write row")?;
            }
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }
}
