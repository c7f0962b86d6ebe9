//! Table names, artifact names and snapshot metadata keys shared across the crate

use std::path::{Path, PathBuf};

/// Primary object table
pub const DATATABLE: &str = "datatable";

/// Link table
pub const LINK_TABLE: &str = "link_table";

/// Tabular artifacts. They are tab separated; the extension is what
/// downstream tooling expects.
pub const DATATABLE_CSV: &str = "datatable.csv";
pub const LINKTABLE_CSV: &str = "linktable.csv";

/// Nested-document artifact
pub const DOCUMENT_JSON: &str = "ntds.json";

/// Parquet field metadata carrying the JET column-type tag
pub const COLTYP_METADATA_KEY: &str = "ese.coltyp";

/// Parquet field metadata carrying the column code page
pub const CODE_PAGE_METADATA_KEY: &str = "ese.cp";

/// Parquet field metadata carrying the JET column id
pub const COLUMN_ID_METADATA_KEY: &str = "ese.columnid";

/// Rows decoded per record batch when reading a snapshot table
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Path of `table` inside a snapshot directory
#[inline]
pub fn snapshot_table_path(root: &Path, table: &str) -> PathBuf {
    root.join(format!("{table}.parquet"))
}
