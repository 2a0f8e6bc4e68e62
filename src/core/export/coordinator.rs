//! Export coordinator - main orchestrator for the export process
//!
//! This module coordinates the export workflow: it resolves the cutoff,
//! builds one query per kind, reads each kind through a cached source handle
//! and hands the entities to the batch processor.

use crate::adapters::datastore::{ClientCache, ClientCacheConfig, EntitySource, JsonlSource, Scope};
use crate::adapters::warehouse::{StagedFileLoader, WarehouseSink};
use crate::config::FerryConfig;
use crate::core::export::batch::{BatchConfig, BatchProcessor, BatchResult};
use crate::core::export::summary::{ExportError, ExportErrorType, ExportSummary};
use crate::core::query::{create_entities_load_query, get_entity_filters, EntityFilters};
use crate::domain::{FerryError, Result, SourceError};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Export coordinator
pub struct ExportCoordinator {
    config: FerryConfig,
    clients: ClientCache<JsonlSource>,
    batch_processor: BatchProcessor,
    shutdown_signal: watch::Receiver<bool>,
    run_started: DateTime<Utc>,
    kinds: Option<Vec<String>>,
}

impl ExportCoordinator {
    /// Create a new export coordinator staging loads under `warehouse.temp_dir`
    pub fn new(config: FerryConfig, shutdown_signal: watch::Receiver<bool>) -> Self {
        let run_started = Utc::now();
        let sink = StagedFileLoader::new(
            &config.warehouse.temp_dir,
            run_started,
            config.warehouse.write_disposition,
            config.warehouse.create_disposition,
        )
        .with_dry_run(config.application.dry_run);

        Self::with_sink(config, shutdown_signal, Arc::new(sink), run_started)
    }

    /// Create a coordinator loading through the given sink
    pub fn with_sink(
        config: FerryConfig,
        shutdown_signal: watch::Receiver<bool>,
        sink: Arc<dyn WarehouseSink>,
        run_started: DateTime<Utc>,
    ) -> Self {
        let clients = ClientCache::new(
            ClientCacheConfig::default()
                .with_ttl(Duration::from_secs(config.source.client_ttl_seconds))
                .with_capacity(config.source.client_cache_capacity),
        );
        let batch_processor = BatchProcessor::new(
            sink,
            BatchConfig::new(config.warehouse_project(), config.warehouse.dataset.clone()),
        );

        Self {
            config,
            clients,
            batch_processor,
            shutdown_signal,
            run_started,
            kinds: None,
        }
    }

    /// Restrict the export to a subset of the configured kinds
    pub fn with_kinds(mut self, kinds: Vec<String>) -> Self {
        self.kinds = Some(kinds);
        self
    }

    /// Kinds this run covers
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a requested kind is not configured.
    pub fn selected_kinds(&self) -> Result<Vec<String>> {
        let configured = self.config.all_kinds();
        let Some(requested) = &self.kinds else {
            return Ok(configured);
        };

        let unknown: Vec<&str> = requested
            .iter()
            .filter(|kind| !configured.contains(kind))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(FerryError::Configuration(format!(
                "Kinds not configured for export: {}",
                unknown.join(", ")
            )));
        }

        Ok(configured
            .into_iter()
            .filter(|kind| requested.contains(kind))
            .collect())
    }

    /// Execute the export
    ///
    /// This is the main entry point for the export process. It:
    /// 1. Resolves the cutoff time and builds per-kind filters
    /// 2. Selects the kinds to export
    /// 3. Exports up to `export.parallel_kinds` kinds at a time
    /// 4. Stops scheduling kinds once a shutdown signal arrives
    /// 5. Generates summary report
    ///
    /// # Errors
    ///
    /// Returns an error if the cutoff or the kind selection is invalid.
    /// Failures of individual kinds are recorded in the summary.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut summary = ExportSummary::new();

        let since_time = self.config.export.cutoff()?.resolve(self.run_started)?;
        let filters = get_entity_filters(&self.config.kinds_to_export, since_time)?;
        let kinds = self.selected_kinds()?;
        let total_kinds = kinds.len();

        crate::log_export_start!(total_kinds, since_time);

        let shutdown = self.shutdown_signal.clone();
        let filters = &filters;
        let results: Vec<(String, Result<BatchResult>)> = stream::iter(kinds)
            .take_while(move |_| futures::future::ready(!*shutdown.borrow()))
            .map(|kind| async move {
                let result = self.export_kind(&kind, filters).await;
                (kind, result)
            })
            .buffer_unordered(self.config.export.parallel_kinds)
            .collect()
            .await;

        summary.kinds_processed = results.len();
        summary.kinds_skipped = total_kinds - results.len();

        for (kind, result) in results {
            match result {
                Ok(batch) => {
                    summary.entities_read += batch.entities_read;
                    summary.records_loaded += batch.records_loaded;
                    summary.failed_records += batch.failed;
                    summary.tables.extend(batch.tables);
                    for message in batch.errors {
                        summary.add_error(
                            ExportError::new(ExportErrorType::Transformation, message)
                                .with_context(format!("kind={kind}")),
                        );
                    }
                }
                Err(e) => {
                    crate::log_error_with_context!(&e, format!("kind={kind}"));
                    summary.add_error(
                        ExportError::new(error_type_for(&e), e.to_string())
                            .with_context(format!("kind={kind}")),
                    );
                }
            }
        }

        if *self.shutdown_signal.borrow() {
            tracing::warn!(
                skipped = summary.kinds_skipped,
                "Shutdown requested, remaining kinds were not exported"
            );
            summary.interrupted = true;
        }

        summary = summary.with_duration(start_time.elapsed());
        crate::log_export_complete!(summary.records_loaded, summary.duration);
        summary.log_summary();

        Ok(summary)
    }

    /// Export a single kind
    async fn export_kind(
        &self,
        kind: &str,
        filters: &BTreeMap<String, EntityFilters>,
    ) -> Result<BatchResult> {
        let query = create_entities_load_query(kind, &self.config.source.project_id, filters)
            .with_namespace(self.config.source.namespace.clone())
            .with_limit(self.config.source.query_limit);

        let scope = Scope::new(query.project.clone(), query.namespace.as_deref());
        let dump_dir = self.config.source.dump_dir.clone();
        let source = self
            .clients
            .get_or_create(&scope, |scope| JsonlSource::open(dump_dir, scope.clone()))
            .await?;

        let entities = source.run_query(&query).await?;
        tracing::info!(kind = %kind, count = entities.len(), "Fetched entities");

        self.batch_processor.process_batch(kind, entities).await
    }
}

fn error_type_for(error: &FerryError) -> ExportErrorType {
    match error {
        FerryError::Source(SourceError::ConnectionFailed { .. }) => ExportErrorType::Connection,
        FerryError::Source(_) => ExportErrorType::Query,
        FerryError::Decode(_) => ExportErrorType::Transformation,
        FerryError::Warehouse(_) => ExportErrorType::Storage,
        FerryError::Configuration(_) => ExportErrorType::Configuration,
        _ => ExportErrorType::Unknown,
    }
}
