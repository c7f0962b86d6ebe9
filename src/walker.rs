//! Forward-only row iteration over one table

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;
use crate::formatter::{format_value, is_unreadable};
use crate::schema::TableSchema;
use crate::store::{Cursor, Store};

/// Parent-object-id column. Its first row is null in the source store,
/// which downstream parsers reject, so an empty value exports as "0".
pub const PARENT_ID_COLUMN: &str = "PDNT_col";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedField {
    pub name: String,
    pub value: String,
}

/// The non-empty fields of one record, in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<FormattedField>,
}

impl Row {
    pub fn fields(&self) -> &[FormattedField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One value per schema column, empty where the row has no field
    pub fn cells<'a>(&'a self, schema: &'a TableSchema) -> impl Iterator<Item = &'a str> + 'a {
        let mut fields = self.fields.iter().peekable();
        schema.columns().iter().map(move |column| {
            match fields.next_if(|field| field.name == column.name) {
                Some(field) => field.value.as_str(),
                None => "",
            }
        })
    }

    fn push(&mut self, name: &str, value: String) {
        if !value.is_empty() {
            self.fields.push(FormattedField {
                name: name.to_string(),
                value,
            });
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

/// Yields one [`Row`] per record of a table.
///
/// The walk stops at the first error; later calls return `None`.
pub struct RowWalker<'s> {
    schema: &'s TableSchema,
    cursor: Box<dyn Cursor + 's>,
    done: bool,
}

impl<'s> RowWalker<'s> {
    pub fn new(store: &'s dyn Store, schema: &'s TableSchema) -> Result<Self> {
        let cursor = store.open_cursor(schema.table())?;
        Ok(Self {
            schema,
            cursor,
            done: false,
        })
    }

    fn read_row(&mut self) -> Result<Option<Row>> {
        if !self.cursor.advance()? {
            return Ok(None);
        }

        let mut row = Row::default();
        for column in self.schema.columns() {
            // No store can read these; never ask it to
            if is_unreadable(&column.name) {
                continue;
            }
            let raw = self.cursor.retrieve(column)?;
            let value = format_value(raw, column)?;
            if column.name == PARENT_ID_COLUMN && value.is_empty() {
                row.push(&column.name, "0".to_string());
            } else {
                row.push(&column.name, value);
            }
        }
        Ok(Some(row))
    }
}

impl Iterator for RowWalker<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.read_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for RowWalker<'_> {}
