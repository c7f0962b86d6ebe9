//! Export statistics tracking module

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counts rows, emitted fields and output bytes across one export run
#[derive(Debug, Clone, Default)]
pub struct ExportStatsTracker {
    rows: Arc<AtomicU64>,
    fields: Arc<AtomicU64>,
    bytes_written: Arc<AtomicU64>,
}

impl ExportStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one exported row carrying `fields` non-empty values
    pub fn add_row(&self, fields: u64) {
        self.rows.fetch_add(1, Ordering::Relaxed);
        self.fields.fetch_add(fields, Ordering::Relaxed);
    }

    pub fn add_bytes(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ExportStats {
        ExportStats {
            rows: self.rows.load(Ordering::Relaxed),
            fields: self.fields.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time export statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportStats {
    pub rows: u64,
    pub fields: u64,
    pub bytes_written: u64,
}

impl ExportStats {
    /// Average non-empty fields per row
    pub fn fields_per_row(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.fields as f64 / self.rows as f64
        }
    }
}
