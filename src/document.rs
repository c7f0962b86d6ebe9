//! Nested JSON document holding both tables

use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::walker::Row;

/// Both tables, materialized. Each row keeps only its non-empty fields.
#[derive(Debug, Default, Serialize)]
pub struct NtdsDocument {
    pub datatable: Vec<Row>,
    pub linktable: Vec<Row>,
}

impl NtdsDocument {
    /// Serialize with two-space indentation and a trailing newline.
    /// Returns the number of bytes written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<u64> {
        let json = serde_json::to_vec_pretty(self)?;
        writer.write_all(&json)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(json.len() as u64 + 1)
    }
}

/// Collect a table's rows, stopping at the first error
pub fn collect_rows<I>(rows: I) -> Result<Vec<Row>>
where
    I: IntoIterator<Item = Result<Row>>,
{
    rows.into_iter().collect()
}
