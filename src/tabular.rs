//! Tab-separated output, one file per table

use std::io::Write;

use crate::error::Result;
use crate::export_stats::ExportStatsTracker;
use crate::schema::TableSchema;
use crate::walker::Row;

/// Keep a value on one cell: tabs and line breaks become spaces
fn escape_tsv_value(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains(['\t', '\n', '\r']) {
        value.replace(['\t', '\n', '\r'], " ").into()
    } else {
        value.into()
    }
}

/// Convert a row to one tabular line, without the line terminator.
/// Every schema column yields a cell, empty when the row has no value.
pub fn row_to_line(row: &Row, schema: &TableSchema) -> String {
    row.cells(schema)
        .map(escape_tsv_value)
        .collect::<Vec<_>>()
        .join("\t")
}

/// Streams a header and rows to `W`, one row in flight at a time
pub struct TabularWriter<'a, W: Write> {
    writer: W,
    schema: &'a TableSchema,
    stats: Option<ExportStatsTracker>,
}

impl<'a, W: Write> TabularWriter<'a, W> {
    pub fn new(writer: W, schema: &'a TableSchema, stats: Option<ExportStatsTracker>) -> Self {
        Self {
            writer,
            schema,
            stats,
        }
    }

    pub fn write_header(&mut self) -> Result<()> {
        let header = self.schema.header("\t");
        self.write_line(&header)
    }

    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        let line = row_to_line(row, self.schema);
        self.write_line(&line)?;
        if let Some(ref stats) = self.stats {
            stats.add_row(row.len() as u64);
        }
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        if let Some(ref stats) = self.stats {
            stats.add_bytes(line.len() as u64 + 1);
        }
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}
