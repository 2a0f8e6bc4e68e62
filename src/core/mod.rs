//! Core business logic for Ferry.
//!
//! # Modules
//!
//! - [`cutoff`] - `H-<n>` / `D-<n>` / ISO-8601 cutoff times
//! - [`query`] - Per-kind filters and query descriptors
//! - [`transform`] - Key decoding and entity-to-record conversion
//! - [`export`] - Export orchestration, batch processing, and reporting
//!
//! # Export Workflow
//!
//! 1. **Cutoff**: Resolve `export.since_time` against the run start
//! 2. **Query**: Build one query per kind, filtered when the kind names a timestamp field
//! 3. **Fetch**: Run each query through a cached source handle
//! 4. **Transform**: Decode keys and flatten entities into records
//! 5. **Load**: Route records to `<project>:<dataset>.<kind>` and stage load jobs
//! 6. **Report**: Generate export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use ferry::config::load_config;
//! use ferry::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ferry.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(config, shutdown_rx);
//!
//! let summary = coordinator.execute_export().await?;
//!
//! println!("Read: {}", summary.entities_read);
//! println!("Loaded: {}", summary.records_loaded);
//! println!("Failed: {}", summary.failed_records);
//! # Ok(())
//! # }
//! ```

pub mod cutoff;
pub mod export;
pub mod query;
pub mod transform;
