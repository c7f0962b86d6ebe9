//! Storage collaborator interface
//!
//! The export pipeline never touches the database file directly. It asks a
//! [`Store`] for column metadata and walks each table through a forward-only
//! [`Cursor`]. Values come back as [`RawValue`]s that borrow from the cursor
//! and are only valid until the next [`Cursor::advance`].

use crate::error::Result;
use crate::schema::ColumnDescriptor;

/// A stored value, tagged with the physical type it was retrieved as
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
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
    /// OLE Automation date: days since 1899-12-30, time as the fraction
    DateTime(f64),
    /// GUID in its on-disk (little-endian) layout
    Guid([u8; 16]),
    /// Raw text bytes in the column's code page
    Text(&'a [u8]),
    Binary(&'a [u8]),
    Nil,
}

impl RawValue<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Bool(_) => "bool",
            RawValue::U8(_) => "u8",
            RawValue::I16(_) => "i16",
            RawValue::U16(_) => "u16",
            RawValue::I32(_) => "i32",
            RawValue::U32(_) => "u32",
            RawValue::I64(_) => "i64",
            RawValue::U64(_) => "u64",
            RawValue::F32(_) => "f32",
            RawValue::F64(_) => "f64",
            RawValue::DateTime(_) => "datetime",
            RawValue::Guid(_) => "guid",
            RawValue::Text(_) => "text",
            RawValue::Binary(_) => "binary",
            RawValue::Nil => "nil",
        }
    }
}

/// Read-only access to the tables of a store
pub trait Store {
    /// Every column of `table`, in the store's order.
    ///
    /// Fails with `SchemaUnavailable` when the table does not exist.
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Open a cursor positioned before the first record of `table`
    fn open_cursor(&self, table: &str) -> Result<Box<dyn Cursor + '_>>;
}

/// Forward-only cursor over the records of one table
pub trait Cursor {
    /// Move to the next record. Returns false once the table is exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Value of `column` at the current record, or `None` when it is unset
    fn retrieve(&self, column: &ColumnDescriptor) -> Result<Option<RawValue<'_>>>;
}

/// Scoped, exclusive use of an attached store.
///
/// The store is released when the session is dropped, whichever way the
/// export ends.
pub struct Session<S: Store> {
    label: String,
    store: S,
}

impl<S: Store> Session<S> {
    pub fn attach(label: impl Into<String>, store: S) -> Self {
        let label = label.into();
        tracing::debug!(source = %label, "attached store read-only");
        Self { label, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<S: Store> Drop for Session<S> {
    fn drop(&mut self) {
        tracing::debug!(source = %self.label, "detached store");
    }
}
