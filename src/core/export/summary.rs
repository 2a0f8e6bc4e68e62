//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::adapters::warehouse::TableRef;
use std::collections::BTreeSet;
use std::time::Duration;

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Number of kinds exported
    pub kinds_processed: usize,

    /// Number of kinds not started because of a shutdown signal
    pub kinds_skipped: usize,

    /// Entities returned by the source
    pub entities_read: usize,

    /// Records handed to the warehouse
    pub records_loaded: usize,

    /// Entities that could not be converted or loaded
    pub failed_records: usize,

    /// Tables written to
    pub tables: BTreeSet<TableRef>,

    /// Duration of the export
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportError>,

    /// Whether the export was interrupted by a shutdown signal
    pub interrupted: bool,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new() -> Self {
        Self {
            kinds_processed: 0,
            kinds_skipped: 0,
            entities_read: 0,
            records_loaded: 0,
            failed_records: 0,
            tables: BTreeSet::new(),
            duration: Duration::from_secs(0),
            errors: Vec::new(),
            interrupted: false,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Check if the export was successful (no failures)
    pub fn is_successful(&self) -> bool {
        self.failed_records == 0 && self.errors.is_empty() && !self.interrupted
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.entities_read == 0 {
            return 100.0;
        }
        (self.records_loaded as f64 / self.entities_read as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            kinds_processed = self.kinds_processed,
            kinds_skipped = self.kinds_skipped,
            entities_read = self.entities_read,
            records_loaded = self.records_loaded,
            failed = self.failed_records,
            tables = self.tables.len(),
            interrupted = self.interrupted,
            duration_secs = self.duration.as_secs(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = error.context.as_deref().unwrap_or(""),
                    "Export error"
                );
            }
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of export error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Source handle could not be opened
    Connection,
    /// Query execution error
    Query,
    /// Key decoding or record conversion error
    Transformation,
    /// Warehouse staging or load error
    Storage,
    /// Configuration error
    Configuration,
    /// Unknown error
    Unknown,
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., kind, table)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}
