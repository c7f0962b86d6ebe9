//! Drives one export run over both tables

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::constants::{DATATABLE, DATATABLE_CSV, DOCUMENT_JSON, LINKTABLE_CSV, LINK_TABLE};
use crate::document::{collect_rows, NtdsDocument};
use crate::error::Result;
use crate::export_stats::{ExportStats, ExportStatsTracker};
use crate::parquet_store::ParquetStore;
use crate::schema::{read_schema, TableSchema};
use crate::store::{Session, Store};
use crate::tabular::TabularWriter;
use crate::walker::RowWalker;

/// Output shape of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    /// One tab-separated file per table
    #[default]
    Csv,
    /// One JSON document holding both tables
    Json,
}

/// Settings for [`run`]
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub source: PathBuf,
    pub format: ExportFormat,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub table: String,
    pub rows: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub tables: Vec<TableSummary>,
    pub outputs: Vec<PathBuf>,
    pub stats: ExportStats,
}

/// Exports the primary and link tables of a store.
///
/// Both schemas are read once, when the exporter is created, and reused
/// for every row of the run.
pub struct Exporter<'s> {
    store: &'s dyn Store,
    datatable: TableSchema,
    link_table: TableSchema,
}

impl<'s> Exporter<'s> {
    pub fn new(store: &'s dyn Store) -> Result<Self> {
        Ok(Self {
            store,
            datatable: read_schema(store, DATATABLE)?,
            link_table: read_schema(store, LINK_TABLE)?,
        })
    }

    pub fn datatable_schema(&self) -> &TableSchema {
        &self.datatable
    }

    pub fn link_table_schema(&self) -> &TableSchema {
        &self.link_table
    }

    pub fn export(&self, format: ExportFormat, output_dir: &Path) -> Result<ExportSummary> {
        match format {
            ExportFormat::Csv => self.export_tabular(output_dir),
            ExportFormat::Json => self.export_document(output_dir),
        }
    }

    /// Write `datatable.csv` and `linktable.csv`, one table at a time
    pub fn export_tabular(&self, output_dir: &Path) -> Result<ExportSummary> {
        let stats = ExportStatsTracker::new();
        let mut tables = Vec::new();
        let mut outputs = Vec::new();

        let targets = [
            (&self.datatable, DATATABLE_CSV),
            (&self.link_table, LINKTABLE_CSV),
        ];
        for (schema, file_name) in targets {
            let path = output_dir.join(file_name);
            let rows = self.write_table(schema, &path, &stats)?;
            tracing::info!(table = schema.table(), rows, path = %path.display(), "exported table");
            tables.push(TableSummary {
                table: schema.table().to_string(),
                rows,
            });
            outputs.push(path);
        }

        Ok(ExportSummary {
            tables,
            outputs,
            stats: stats.snapshot(),
        })
    }

    fn write_table(
        &self,
        schema: &TableSchema,
        path: &Path,
        stats: &ExportStatsTracker,
    ) -> Result<u64> {
        let file = BufWriter::new(File::create(path)?);
        let mut writer = TabularWriter::new(file, schema, Some(stats.clone()));
        writer.write_header()?;

        let mut rows = 0;
        for row in RowWalker::new(self.store, schema)? {
            writer.write_row(&row?)?;
            rows += 1;
        }
        writer.finish()?;
        Ok(rows)
    }

    /// Write `ntds.json` holding both tables
    pub fn export_document(&self, output_dir: &Path) -> Result<ExportSummary> {
        let stats = ExportStatsTracker::new();
        let mut document = NtdsDocument::default();
        let mut tables = Vec::new();

        for schema in [&self.datatable, &self.link_table] {
            let rows = collect_rows(RowWalker::new(self.store, schema)?)?;
            for row in &rows {
                stats.add_row(row.len() as u64);
            }
            tracing::info!(table = schema.table(), rows = rows.len(), "collected table");
            tables.push(TableSummary {
                table: schema.table().to_string(),
                rows: rows.len() as u64,
            });
            if schema.table() == DATATABLE {
                document.datatable = rows;
            } else {
                document.linktable = rows;
            }
        }

        let path = output_dir.join(DOCUMENT_JSON);
        let bytes = document.write_to(BufWriter::new(File::create(&path)?))?;
        stats.add_bytes(bytes);
        tracing::info!(path = %path.display(), bytes, "wrote document");

        Ok(ExportSummary {
            tables,
            outputs: vec![path],
            stats: stats.snapshot(),
        })
    }
}

/// Open the snapshot at `config.source` and export it.
///
/// The store session is released before this returns, on success or error.
pub fn run(config: &ExportConfig) -> Result<ExportSummary> {
    let store = ParquetStore::open(&config.source)?;
    let session = Session::attach(config.source.display().to_string(), store);
    let exporter = Exporter::new(session.store())?;
    exporter.export(config.format, &config.output_dir)
}
