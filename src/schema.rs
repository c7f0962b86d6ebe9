//! Column metadata for the exported tables

use crate::error::Result;
use crate::store::Store;

/// Physical storage type of a column, keyed by the JET column-type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Nil,
    Bit,
    UnsignedByte,
    Short,
    Long,
    Currency,
    IeeeSingle,
    IeeeDouble,
    DateTime,
    Binary,
    Text,
    LongBinary,
    LongText,
    UnsignedLong,
    LongLong,
    Guid,
    UnsignedShort,
    UnsignedLongLong,
    /// A tag with no formatting rule (e.g. 13, the retired SLV type)
    Unsupported(u32),
}

impl ColumnType {
    pub fn from_tag(tag: u32) -> Self {
        match tag {
            0 => ColumnType::Nil,
            1 => ColumnType::Bit,
            2 => ColumnType::UnsignedByte,
            3 => ColumnType::Short,
            4 => ColumnType::Long,
            5 => ColumnType::Currency,
            6 => ColumnType::IeeeSingle,
            7 => ColumnType::IeeeDouble,
            8 => ColumnType::DateTime,
            9 => ColumnType::Binary,
            10 => ColumnType::Text,
            11 => ColumnType::LongBinary,
            12 => ColumnType::LongText,
            14 => ColumnType::UnsignedLong,
            15 => ColumnType::LongLong,
            16 => ColumnType::Guid,
            17 => ColumnType::UnsignedShort,
            18 => ColumnType::UnsignedLongLong,
            other => ColumnType::Unsupported(other),
        }
    }

    pub fn tag(&self) -> u32 {
        match self {
            ColumnType::Nil => 0,
            ColumnType::Bit => 1,
            ColumnType::UnsignedByte => 2,
            ColumnType::Short => 3,
            ColumnType::Long => 4,
            ColumnType::Currency => 5,
            ColumnType::IeeeSingle => 6,
            ColumnType::IeeeDouble => 7,
            ColumnType::DateTime => 8,
            ColumnType::Binary => 9,
            ColumnType::Text => 10,
            ColumnType::LongBinary => 11,
            ColumnType::LongText => 12,
            ColumnType::UnsignedLong => 14,
            ColumnType::LongLong => 15,
            ColumnType::Guid => 16,
            ColumnType::UnsignedShort => 17,
            ColumnType::UnsignedLongLong => 18,
            ColumnType::Unsupported(tag) => *tag,
        }
    }

    /// Short name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ColumnType::Nil => "nil",
            ColumnType::Bit => "bit",
            ColumnType::UnsignedByte => "unsigned byte",
            ColumnType::Short => "short",
            ColumnType::Long => "long",
            ColumnType::Currency => "currency",
            ColumnType::IeeeSingle => "ieee single",
            ColumnType::IeeeDouble => "ieee double",
            ColumnType::DateTime => "datetime",
            ColumnType::Binary => "binary",
            ColumnType::Text => "text",
            ColumnType::LongBinary => "long binary",
            ColumnType::LongText => "long text",
            ColumnType::UnsignedLong => "unsigned long",
            ColumnType::LongLong => "long long",
            ColumnType::Guid => "guid",
            ColumnType::UnsignedShort => "unsigned short",
            ColumnType::UnsignedLongLong => "unsigned long long",
            ColumnType::Unsupported(_) => "unsupported",
        }
    }
}

/// Text encoding declared for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CodePage {
    #[default]
    Ascii,
    Unicode,
    Other(u16),
}

impl CodePage {
    pub const ASCII_ID: u16 = 1252;
    pub const UNICODE_ID: u16 = 1200;
    pub const UTF8_ID: u16 = 65001;

    pub fn from_id(id: u16) -> Self {
        match id {
            Self::ASCII_ID => CodePage::Ascii,
            Self::UNICODE_ID => CodePage::Unicode,
            other => CodePage::Other(other),
        }
    }

    pub fn id(&self) -> u16 {
        match self {
            CodePage::Ascii => Self::ASCII_ID,
            CodePage::Unicode => Self::UNICODE_ID,
            CodePage::Other(id) => *id,
        }
    }
}

/// One column as reported by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub id: u32,
    pub name: String,
    pub column_type: ColumnType,
    pub code_page: CodePage,
}

impl ColumnDescriptor {
    pub fn new(id: u32, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id,
            name: name.into(),
            column_type,
            code_page: CodePage::default(),
        }
    }

    pub fn with_code_page(mut self, code_page: CodePage) -> Self {
        self.code_page = code_page;
        self
    }
}

/// The ordered columns of one table, read once per export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names joined by `separator`, in schema order
    pub fn header(&self, separator: &str) -> String {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Read the column list of `table` from the store
pub fn read_schema(store: &dyn Store, table: &str) -> Result<TableSchema> {
    let columns = store.list_columns(table)?;
    tracing::debug!(table, columns = columns.len(), "read table schema");
    Ok(TableSchema::new(table, columns))
}
