//! Read-only store over a columnar snapshot of the database
//!
//! A snapshot is a directory with one parquet file per table
//! (`datatable.parquet`, `link_table.parquet`). Each parquet field is one
//! column. The physical storage type is read from the `ese.coltyp` field
//! metadata, or inferred from the Arrow type when that key is missing.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Field, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};

use crate::constants::{
    snapshot_table_path, CODE_PAGE_METADATA_KEY, COLTYP_METADATA_KEY, COLUMN_ID_METADATA_KEY,
    DEFAULT_BATCH_SIZE,
};
use crate::error::{ExportError, Result};
use crate::schema::{CodePage, ColumnDescriptor, ColumnType};
use crate::store::{Cursor, RawValue, Store};

/// Storage type for a field that carries no `ese.coltyp` metadata
fn infer_column_type(data_type: &DataType) -> Option<ColumnType> {
    let column_type = match data_type {
        DataType::Null => ColumnType::Nil,
        DataType::Boolean => ColumnType::Bit,
        DataType::UInt8 => ColumnType::UnsignedByte,
        DataType::Int16 => ColumnType::Short,
        DataType::UInt16 => ColumnType::UnsignedShort,
        DataType::Int32 => ColumnType::Long,
        DataType::UInt32 => ColumnType::UnsignedLong,
        DataType::Int64 => ColumnType::LongLong,
        DataType::UInt64 => ColumnType::UnsignedLongLong,
        DataType::Float32 => ColumnType::IeeeSingle,
        DataType::Float64 => ColumnType::IeeeDouble,
        DataType::Utf8 | DataType::LargeUtf8 => ColumnType::LongText,
        DataType::Binary | DataType::LargeBinary => ColumnType::LongBinary,
        DataType::FixedSizeBinary(16) => ColumnType::Guid,
        _ => return None,
    };
    Some(column_type)
}

fn parse_metadata<T: std::str::FromStr>(
    table: &str,
    field: &Field,
    key: &str,
) -> Result<Option<T>> {
    match field.metadata().get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ExportError::SchemaUnavailable {
                table: table.to_string(),
                reason: format!("column {} has invalid {key} value {raw:?}", field.name()),
            }),
    }
}

/// Describe one parquet field as a store column
fn describe_field(table: &str, index: usize, field: &Field) -> Result<ColumnDescriptor> {
    let column_type = match parse_metadata::<u32>(table, field, COLTYP_METADATA_KEY)? {
        Some(tag) => ColumnType::from_tag(tag),
        None => infer_column_type(field.data_type()).ok_or_else(|| {
            ExportError::SchemaUnavailable {
                table: table.to_string(),
                reason: format!(
                    "column {} has no storage type for arrow type {}",
                    field.name(),
                    field.data_type()
                ),
            }
        })?,
    };

    // Arrow strings are always UTF-8, whatever code page the source column had
    let declared = parse_metadata::<u16>(table, field, CODE_PAGE_METADATA_KEY)?;
    let code_page = match field.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => CodePage::Other(CodePage::UTF8_ID),
        _ => declared.map(CodePage::from_id).unwrap_or_default(),
    };

    let id = parse_metadata::<u32>(table, field, COLUMN_ID_METADATA_KEY)?
        .unwrap_or(index as u32 + 1);

    Ok(ColumnDescriptor {
        id,
        name: field.name().clone(),
        column_type,
        code_page,
    })
}

/// Convert a non-null cell into the raw value the column declares
fn raw_value<'a>(
    array: &'a dyn Array,
    row: usize,
    column: &ColumnDescriptor,
) -> Result<RawValue<'a>> {
    let text_column = matches!(column.column_type, ColumnType::Text | ColumnType::LongText);
    let bytes_value = |bytes: &'a [u8]| {
        if text_column {
            RawValue::Text(bytes)
        } else {
            RawValue::Binary(bytes)
        }
    };

    let raw = match array.data_type() {
        DataType::Null => RawValue::Nil,
        DataType::Boolean => RawValue::Bool(array.as_boolean().value(row)),
        DataType::UInt8 => RawValue::U8(array.as_primitive::<UInt8Type>().value(row)),
        DataType::Int16 => RawValue::I16(array.as_primitive::<Int16Type>().value(row)),
        DataType::UInt16 => RawValue::U16(array.as_primitive::<UInt16Type>().value(row)),
        DataType::Int32 => RawValue::I32(array.as_primitive::<Int32Type>().value(row)),
        DataType::UInt32 => RawValue::U32(array.as_primitive::<UInt32Type>().value(row)),
        DataType::Int64 => RawValue::I64(array.as_primitive::<Int64Type>().value(row)),
        DataType::UInt64 => RawValue::U64(array.as_primitive::<UInt64Type>().value(row)),
        DataType::Float32 => RawValue::F32(array.as_primitive::<Float32Type>().value(row)),
        DataType::Float64 => {
            let value = array.as_primitive::<Float64Type>().value(row);
            if column.column_type == ColumnType::DateTime {
                RawValue::DateTime(value)
            } else {
                RawValue::F64(value)
            }
        }
        DataType::Utf8 => RawValue::Text(array.as_string::<i32>().value(row).as_bytes()),
        DataType::LargeUtf8 => RawValue::Text(array.as_string::<i64>().value(row).as_bytes()),
        DataType::Binary => bytes_value(array.as_binary::<i32>().value(row)),
        DataType::LargeBinary => bytes_value(array.as_binary::<i64>().value(row)),
        DataType::FixedSizeBinary(_) => {
            let bytes = array.as_fixed_size_binary().value(row);
            if column.column_type == ColumnType::Guid {
                let guid = bytes.try_into().map_err(|_| {
                    ExportError::Storage(format!(
                        "column {} holds a {}-byte guid",
                        column.name,
                        bytes.len()
                    ))
                })?;
                RawValue::Guid(guid)
            } else {
                bytes_value(bytes)
            }
        }
        other => {
            return Err(ExportError::Storage(format!(
                "column {} has unreadable arrow type {other}",
                column.name
            )))
        }
    };
    Ok(raw)
}

/// Snapshot directory opened for reading
#[derive(Debug, Clone)]
pub struct ParquetStore {
    root: PathBuf,
}

impl ParquetStore {
    /// Open the snapshot at `root`. Fails with `SourceNotFound` when the
    /// directory does not exist; nothing else is read until a table is used.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            return Err(ExportError::SourceNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn reader_builder(&self, table: &str) -> Result<ParquetRecordBatchReaderBuilder<File>> {
        let path = snapshot_table_path(&self.root, table);
        let unavailable = |reason: String| ExportError::SchemaUnavailable {
            table: table.to_string(),
            reason,
        };
        let file = File::open(&path)
            .map_err(|e| unavailable(format!("cannot open {}: {e}", path.display())))?;
        ParquetRecordBatchReaderBuilder::try_new(file)
            .map_err(|e| unavailable(format!("cannot read {}: {e}", path.display())))
    }

    fn describe(
        table: &str,
        builder: &ParquetRecordBatchReaderBuilder<File>,
    ) -> Result<Vec<ColumnDescriptor>> {
        builder
            .schema()
            .fields()
            .iter()
            .enumerate()
            .map(|(index, field)| describe_field(table, index, field))
            .collect()
    }
}

impl Store for ParquetStore {
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let builder = self.reader_builder(table)?;
        Self::describe(table, &builder)
    }

    fn open_cursor(&self, table: &str) -> Result<Box<dyn Cursor + '_>> {
        let builder = self.reader_builder(table)?;
        let columns = Self::describe(table, &builder)?
            .into_iter()
            .enumerate()
            .map(|(index, column)| (column.id, index))
            .collect();
        let reader = builder.with_batch_size(DEFAULT_BATCH_SIZE).build()?;

        Ok(Box::new(ParquetCursor {
            reader,
            columns,
            batch: None,
            row: None,
        }))
    }
}

/// Cursor over the record batches of one snapshot table
struct ParquetCursor {
    reader: ParquetRecordBatchReader,
    /// Column id to batch column index
    columns: HashMap<u32, usize>,
    batch: Option<RecordBatch>,
    row: Option<usize>,
}

impl Cursor for ParquetCursor {
    fn advance(&mut self) -> Result<bool> {
        loop {
            if let Some(ref batch) = self.batch {
                let next = self.row.map_or(0, |r| r + 1);
                if next < batch.num_rows() {
                    self.row = Some(next);
                    return Ok(true);
                }
            }

            match self.reader.next() {
                Some(batch) => {
                    self.batch = Some(batch?);
                    self.row = None;
                }
                None => {
                    self.batch = None;
                    self.row = None;
                    return Ok(false);
                }
            }
        }
    }

    fn retrieve(&self, column: &ColumnDescriptor) -> Result<Option<RawValue<'_>>> {
        let (batch, row) = match (&self.batch, self.row) {
            (Some(batch), Some(row)) => (batch, row),
            _ => return Err(ExportError::Storage("cursor is not on a record".to_string())),
        };
        let index = *self.columns.get(&column.id).ok_or_else(|| {
            ExportError::Storage(format!("unknown column id {} ({})", column.id, column.name))
        })?;

        let array = batch.column(index).as_ref();
        if array.is_null(row) {
            return Ok(None);
        }
        raw_value(array, row, column).map(Some)
    }
}
