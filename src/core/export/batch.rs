//! Batch processing for kind exports
//!
//! This module converts the entities of one kind into records, routes each
//! record to its table and hands every table's records to the warehouse sink.

use crate::adapters::warehouse::{destination_for, TableRef, WarehouseSink};
use crate::core::transform::{entity_to_record, Record};
use crate::domain::{Entity, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Warehouse project
    pub project: String,
    /// Warehouse dataset
    pub dataset: String,
}

impl BatchConfig {
    /// Create a new batch configuration
    pub fn new(project: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
        }
    }
}

/// Result of processing one kind
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Entities received
    pub entities_read: usize,
    /// Records accepted by the sink
    pub records_loaded: usize,
    /// Entities that failed conversion or whose load failed
    pub failed: usize,
    /// Tables written to
    pub tables: BTreeSet<TableRef>,
    /// Errors encountered
    pub errors: Vec<String>,
}

impl BatchResult {
    /// Create a new empty batch result
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a failed entity
    pub fn add_failure(&mut self, error: String) {
        self.failed += 1;
        self.errors.push(error);
    }

    /// Merge another batch result into this one
    pub fn merge(&mut self, other: BatchResult) {
        self.entities_read += other.entities_read;
        self.records_loaded += other.records_loaded;
        self.failed += other.failed;
        self.tables.extend(other.tables);
        self.errors.extend(other.errors);
    }
}

/// Batch processor for entities of one kind
pub struct BatchProcessor {
    sink: Arc<dyn WarehouseSink>,
    config: BatchConfig,
}

impl BatchProcessor {
    /// Create a new batch processor
    pub fn new(sink: Arc<dyn WarehouseSink>, config: BatchConfig) -> Self {
        Self { sink, config }
    }

    /// Convert, route and load one kind's entities
    ///
    /// An entity whose key does not decode is counted as failed and the rest
    /// of the kind continues. A table whose load fails counts all of its
    /// records as failed.
    ///
    /// # Errors
    ///
    /// Returns an error only if routing a converted record fails.
    pub async fn process_batch(&self, kind: &str, entities: Vec<Entity>) -> Result<BatchResult> {
        let mut result = BatchResult::new();
        result.entities_read = entities.len();

        let mut by_table: BTreeMap<TableRef, Vec<Record>> = BTreeMap::new();

        for entity in &entities {
            match entity_to_record(entity) {
                Ok(record) => {
                    let table =
                        destination_for(&record, &self.config.project, &self.config.dataset)?;
                    by_table.entry(table).or_default().push(record);
                }
                Err(e) => {
                    tracing::warn!(
                        kind = %kind,
                        key = %entity.key,
                        error = %e,
                        "Failed to convert entity, skipping"
                    );
                    result.add_failure(format!("{}: {e}", entity.key));
                }
            }
        }

        for (table, records) in by_table {
            let rows = records.len();
            crate::log_batch_processing!(kind, &table, rows);

            match self.sink.load(&table, records).await {
                Ok(outcome) => {
                    result.records_loaded += outcome.rows;
                    result.tables.insert(table);
                }
                Err(e) => {
                    tracing::error!(
                        kind = %kind,
                        table = %table,
                        rows,
                        error = %e,
                        "Failed to load table"
                    );
                    result.failed += rows;
                    result.errors.push(format!("load into {table} failed: {e}"));
                }
            }
        }

        tracing::info!(
            kind = %kind,
            read = result.entities_read,
            loaded = result.records_loaded,
            failed = result.failed,
            "Processed kind"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::warehouse::LoadOutcome;
    use crate::domain::key::Key;
    use crate::domain::{FerryError, WarehouseError};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        loads: Mutex<Vec<(TableRef, Vec<Record>)>>,
        fail_table: Option<String>,
    }

    #[async_trait]
    impl WarehouseSink for RecordingSink {
        async fn load(&self, table: &TableRef, records: Vec<Record>) -> Result<LoadOutcome> {
            if self.fail_table.as_deref() == Some(table.table.as_str()) {
                return Err(FerryError::Warehouse(WarehouseError::LoadRejected {
                    table: table.to_string(),
                    message: "rejected".to_string(),
                }));
            }
            let rows = records.len();
            self.loads.lock().await.push((table.clone(), records));
            Ok(LoadOutcome {
                table: table.clone(),
                rows,
                staged_file: None,
                job_id: None,
            })
        }
    }

    fn entity(path: Vec<crate::domain::IdOrName>) -> Entity {
        Entity::new(Key::new(path), Vec::<String>::new())
    }

    fn processor(sink: Arc<RecordingSink>) -> BatchProcessor {
        BatchProcessor::new(sink, BatchConfig::new("shop", "analytics"))
    }

    #[test]
    fn test_batch_result_merge() {
        let mut a = BatchResult::new();
        a.entities_read = 3;
        a.records_loaded = 2;
        a.add_failure("bad".to_string());

        let mut b = BatchResult::new();
        b.entities_read = 1;
        b.records_loaded = 1;
        b.tables.insert(TableRef::new("shop", "analytics", "order"));

        a.merge(b);
        assert_eq!(a.entities_read, 4);
        assert_eq!(a.records_loaded, 3);
        assert_eq!(a.failed, 1);
        assert_eq!(a.tables.len(), 1);
    }

    #[tokio::test]
    async fn test_process_batch_groups_by_table() {
        let sink = Arc::new(RecordingSink::default());
        let entities = vec![
            entity(vec!["Order".into(), 1.into()]),
            entity(vec!["Customer".into(), "alice".into(), "Order".into(), 2.into()]),
        ];

        let result = processor(sink.clone())
            .process_batch("Order", entities)
            .await
            .unwrap();

        assert_eq!(result.entities_read, 2);
        assert_eq!(result.records_loaded, 2);
        assert_eq!(result.failed, 0);

        let loads = sink.loads.lock().await;
        assert_eq!(loads.len(), 1);
        assert_eq!(loads[0].0.to_string(), "shop:analytics.order");
        assert_eq!(loads[0].1.len(), 2);
    }

    #[tokio::test]
    async fn test_decode_failure_skips_entity() {
        let sink = Arc::new(RecordingSink::default());
        let entities = vec![
            entity(vec!["Order".into(), 1.into()]),
            entity(vec!["Order".into()]),
        ];

        let result = processor(sink.clone())
            .process_batch("Order", entities)
            .await
            .unwrap();

        assert_eq!(result.records_loaded, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_load_failure_counts_rows() {
        let sink = Arc::new(RecordingSink {
            fail_table: Some("order".to_string()),
            ..Default::default()
        });
        let entities = vec![
            entity(vec!["Order".into(), 1.into()]),
            entity(vec!["Order".into(), 2.into()]),
        ];

        let result = processor(sink).process_batch("Order", entities).await.unwrap();

        assert_eq!(result.records_loaded, 0);
        assert_eq!(result.failed, 2);
        assert!(result.tables.is_empty());
    }
}
