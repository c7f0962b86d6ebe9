//! In-memory store, used for tests and for callers that already hold
//! decoded table data

use std::collections::BTreeMap;

use crate::error::{ExportError, Result};
use crate::schema::ColumnDescriptor;
use crate::store::{Cursor, RawValue, Store};

/// Owned counterpart of [`RawValue`]
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryValue {
    /// No value stored for the column
    Absent,
    Nil,
    Bool(bool),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    DateTime(f64),
    Guid([u8; 16]),
    Text(Vec<u8>),
    Binary(Vec<u8>),
}

impl MemoryValue {
    /// Text encoded as UTF-16LE, the layout of Unicode columns
    pub fn unicode(text: &str) -> Self {
        MemoryValue::Text(text.encode_utf16().flat_map(u16::to_le_bytes).collect())
    }

    pub fn ascii(text: &str) -> Self {
        MemoryValue::Text(text.as_bytes().to_vec())
    }

    fn as_raw(&self) -> Option<RawValue<'_>> {
        let raw = match self {
            MemoryValue::Absent => return None,
            MemoryValue::Nil => RawValue::Nil,
            MemoryValue::Bool(v) => RawValue::Bool(*v),
            MemoryValue::U8(v) => RawValue::U8(*v),
            MemoryValue::I16(v) => RawValue::I16(*v),
            MemoryValue::U16(v) => RawValue::U16(*v),
            MemoryValue::I32(v) => RawValue::I32(*v),
            MemoryValue::U32(v) => RawValue::U32(*v),
            MemoryValue::I64(v) => RawValue::I64(*v),
            MemoryValue::U64(v) => RawValue::U64(*v),
            MemoryValue::F32(v) => RawValue::F32(*v),
            MemoryValue::F64(v) => RawValue::F64(*v),
            MemoryValue::DateTime(v) => RawValue::DateTime(*v),
            MemoryValue::Guid(v) => RawValue::Guid(*v),
            MemoryValue::Text(v) => RawValue::Text(v),
            MemoryValue::Binary(v) => RawValue::Binary(v),
        };
        Some(raw)
    }
}

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Vec<MemoryValue>>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, MemoryTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a table; existing rows are discarded
    pub fn add_table(&mut self, name: &str, columns: Vec<ColumnDescriptor>) {
        self.tables.insert(
            name.to_string(),
            MemoryTable {
                columns,
                rows: Vec::new(),
            },
        );
    }

    /// Append a record. Values are given in column order; missing trailing
    /// values read as absent.
    ///
    /// # Panics
    /// Panics if the table has not been added.
    pub fn push_row(&mut self, table: &str, values: Vec<MemoryValue>) {
        self.tables
            .get_mut(table)
            .unwrap_or_else(|| panic!("unknown table {table}"))
            .rows
            .push(values);
    }

    fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| ExportError::SchemaUnavailable {
                table: name.to_string(),
                reason: "no such table".to_string(),
            })
    }
}

impl Store for MemoryStore {
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        Ok(self.table(table)?.columns.clone())
    }

    fn open_cursor(&self, table: &str) -> Result<Box<dyn Cursor + '_>> {
        Ok(Box::new(MemoryCursor {
            table: self.table(table)?,
            position: None,
        }))
    }
}

struct MemoryCursor<'a> {
    table: &'a MemoryTable,
    position: Option<usize>,
}

impl Cursor for MemoryCursor<'_> {
    fn advance(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.table.rows.len() {
            self.position = Some(next);
            Ok(true)
        } else {
            self.position = Some(self.table.rows.len());
            Ok(false)
        }
    }

    fn retrieve(&self, column: &ColumnDescriptor) -> Result<Option<RawValue<'_>>> {
        let row = self
            .position
            .and_then(|p| self.table.rows.get(p))
            .ok_or_else(|| ExportError::Storage("cursor is not on a record".to_string()))?;
        let index = self
            .table
            .columns
            .iter()
            .position(|c| c.id == column.id)
            .ok_or_else(|| {
                ExportError::Storage(format!("unknown column id {} ({})", column.id, column.name))
            })?;
        Ok(row.get(index).and_then(MemoryValue::as_raw))
    }
}
