// Implementations
pub mod constants;
pub mod document;
pub mod error;
pub mod export;
pub mod export_stats;
pub mod formatter;
pub mod memory_store;
pub mod parquet_store;
pub mod schema;
pub mod store;
pub mod tabular;
pub mod walker;

// Export the main types
pub use error::{ExportError, Result};
pub use export::{run, ExportConfig, ExportFormat, ExportSummary, Exporter, TableSummary};
pub use export_stats::{ExportStats, ExportStatsTracker};
pub use formatter::format_value;
pub use memory_store::{MemoryStore, MemoryValue};
pub use parquet_store::ParquetStore;
pub use schema::{read_schema, CodePage, ColumnDescriptor, ColumnType, TableSchema};
pub use store::{Cursor, RawValue, Session, Store};
pub use walker::{FormattedField, Row, RowWalker};
