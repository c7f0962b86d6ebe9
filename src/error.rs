//! Error types for the export pipeline
//!
//! Every failure is fatal to the run. Nothing in the formatter or the row
//! walker downgrades an error to a blank value.

use std::path::PathBuf;

/// Errors raised while reading a store and writing its export artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The configured store path does not exist
    #[error("ntds source does not exist in the path {path:?}")]
    SourceNotFound { path: PathBuf },

    /// The table is missing or the store rejected the metadata request
    #[error("schema unavailable for table {table}: {reason}")]
    SchemaUnavailable { table: String, reason: String },

    /// The column carries a storage type with no formatting rule
    #[error("unhandled column type {tag} for column {column} (id {column_id})")]
    UnsupportedColumnType {
        column: String,
        column_id: u32,
        tag: u32,
    },

    /// The store returned a value whose physical type disagrees with the schema
    #[error("column {column} declared as {expected} but the store returned {found}")]
    ValueMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Cursor advance or column retrieval failed
    #[error("storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, ExportError>;
