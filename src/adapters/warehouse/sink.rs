//! Warehouse sinks
//!
//! A [`WarehouseSink`] bulk-loads records into one table. [`StagedFileLoader`]
//! stages each table as newline-delimited JSON under a per-run directory and
//! writes a load-job manifest next to it, ready to be submitted to the
//! warehouse.

use super::routing::TableRef;
use crate::config::{CreateDisposition, WriteDisposition};
use crate::core::transform::Record;
use crate::domain::{Result, WarehouseError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Format of the run directory name
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Source format recorded in load manifests
pub const SOURCE_FORMAT: &str = "NEWLINE_DELIMITED_JSON";

/// Result of loading one table
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// Destination table
    pub table: TableRef,
    /// Rows handed to the sink
    pub rows: usize,
    /// Staged data file, if anything was written
    pub staged_file: Option<PathBuf>,
    /// Load job id, if a job was prepared
    pub job_id: Option<Uuid>,
}

/// Load-job manifest written next to each staged file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadJobManifest {
    pub job_id: Uuid,
    pub source: PathBuf,
    pub source_format: String,
    pub destination: String,
    pub write_disposition: WriteDisposition,
    pub create_disposition: CreateDisposition,
    pub autodetect: bool,
    pub row_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Bulk-load target
#[async_trait]
pub trait WarehouseSink: Send + Sync {
    /// Load `records` into `table`
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be staged or the load is
    /// rejected by the write disposition.
    async fn load(&self, table: &TableRef, records: Vec<Record>) -> Result<LoadOutcome>;
}

/// Sink staging newline-delimited JSON files plus load-job manifests
///
/// Files go to `<temp_dir>/<run_stamp>/<dataset>.<table>.json` with the
/// manifest at `<dataset>.<table>.load.json`. Within one run, a second load
/// into the same table replaces the staged file under `WRITE_TRUNCATE`, is
/// appended under `WRITE_APPEND` and is rejected under `WRITE_EMPTY`.
pub struct StagedFileLoader {
    run_dir: PathBuf,
    write_disposition: WriteDisposition,
    create_disposition: CreateDisposition,
    dry_run: bool,
    staged_rows: Mutex<HashMap<TableRef, usize>>,
}

impl StagedFileLoader {
    /// Creates a loader staging under `temp_dir/<run_started as %Y%m%d%H%M%S>`
    pub fn new(
        temp_dir: impl AsRef<Path>,
        run_started: DateTime<Utc>,
        write_disposition: WriteDisposition,
        create_disposition: CreateDisposition,
    ) -> Self {
        let run_dir = temp_dir
            .as_ref()
            .join(run_started.format(RUN_STAMP_FORMAT).to_string());
        Self {
            run_dir,
            write_disposition,
            create_disposition,
            dry_run: false,
            staged_rows: Mutex::new(HashMap::new()),
        }
    }

    /// In dry-run mode nothing is written
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Directory of this run's staged files
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Path of the staged data file for `table`
    pub fn staged_path(&self, table: &TableRef) -> PathBuf {
        self.run_dir
            .join(format!("{}.{}.json", table.dataset, table.table))
    }

    /// Path of the load manifest for `table`
    pub fn manifest_path(&self, table: &TableRef) -> PathBuf {
        self.run_dir
            .join(format!("{}.{}.load.json", table.dataset, table.table))
    }

    fn staging_error(table: &TableRef, error: impl std::fmt::Display) -> WarehouseError {
        WarehouseError::StagingFailed {
            table: table.to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl WarehouseSink for StagedFileLoader {
    async fn load(&self, table: &TableRef, records: Vec<Record>) -> Result<LoadOutcome> {
        let rows = records.len();

        if self.dry_run {
            tracing::info!(table = %table, rows, "Dry run: skipping load");
            return Ok(LoadOutcome {
                table: table.clone(),
                rows,
                staged_file: None,
                job_id: None,
            });
        }

        let mut body = String::new();
        for record in &records {
            let line = record
                .to_json_line()
                .map_err(|e| Self::staging_error(table, e))?;
            body.push_str(&line);
            body.push('\n');
        }

        let mut staged_rows = self.staged_rows.lock().await;
        let previous = staged_rows.get(table).copied();

        let append = match (previous, self.write_disposition) {
            (Some(_), WriteDisposition::WriteEmpty) => {
                return Err(WarehouseError::LoadRejected {
                    table: table.to_string(),
                    message: "table already loaded in this run and write disposition is WRITE_EMPTY"
                        .to_string(),
                }
                .into());
            }
            (Some(_), WriteDisposition::WriteAppend) => true,
            _ => false,
        };

        tokio::fs::create_dir_all(&self.run_dir)
            .await
            .map_err(|e| Self::staging_error(table, e))?;

        let staged_file = self.staged_path(table);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&staged_file)
            .await
            .map_err(|e| Self::staging_error(table, e))?;
        file.write_all(body.as_bytes())
            .await
            .map_err(|e| Self::staging_error(table, e))?;
        file.flush()
            .await
            .map_err(|e| Self::staging_error(table, e))?;

        let row_count = if append {
            previous.unwrap_or(0) + rows
        } else {
            rows
        };

        let manifest = LoadJobManifest {
            job_id: Uuid::new_v4(),
            source: staged_file.clone(),
            source_format: SOURCE_FORMAT.to_string(),
            destination: table.to_string(),
            write_disposition: self.write_disposition,
            create_disposition: self.create_disposition,
            autodetect: true,
            row_count,
            created_at: Utc::now(),
        };
        let manifest_json =
            serde_json::to_string_pretty(&manifest).map_err(|e| Self::staging_error(table, e))?;
        tokio::fs::write(self.manifest_path(table), manifest_json)
            .await
            .map_err(|e| Self::staging_error(table, e))?;

        staged_rows.insert(table.clone(), row_count);

        tracing::info!(
            table = %table,
            rows,
            job_id = %manifest.job_id,
            staged_file = %staged_file.display(),
            write_disposition = %self.write_disposition,
            "Staged load job"
        );

        Ok(LoadOutcome {
            table: table.clone(),
            rows,
            staged_file: Some(staged_file),
            job_id: Some(manifest.job_id),
        })
    }
}
