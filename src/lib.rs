// Ferry - Document store to warehouse export tool
// Copyright (c) 2025 Ferry Contributors
// Licensed under the MIT License

//! # Ferry - Document store to warehouse export
//!
//! Ferry reads entity kinds from a schemaless document store, converts every
//! entity into a flat record and bulk-loads the records into columnar
//! warehouse tables, one table per kind.
//!
//! ## Architecture
//!
//! - [`domain`] - keys, property values, entities and errors
//! - [`core`] - key decoding, record conversion, query building, cutoff
//!   resolution and the export pipeline
//! - [`adapters`] - the document-store source and warehouse sink
//! - [`config`] - TOML configuration with environment overrides
//! - [`logging`] - structured logging
//! - [`cli`] - command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ferry::config::load_config;
//! use ferry::core::export::ExportCoordinator;
//! use tokio::sync::watch;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ferry.toml")?;
//! let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!
//! let coordinator = ExportCoordinator::new(config, shutdown_rx);
//! let summary = coordinator.execute_export().await?;
//!
//! println!("Loaded {} records into {} tables", summary.records_loaded, summary.tables.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Record conversion
//!
//! ```rust
//! use ferry::core::transform::entity_to_record;
//! use ferry::domain::key::Key;
//! use ferry::domain::Entity;
//!
//! let key = Key::new(["Customer".into(), "alice".into(), "Order".into(), 7i64.into()]);
//! let entity = Entity::builder(key).property("total", 12.5).build().unwrap();
//!
//! let record = entity_to_record(&entity).unwrap();
//! assert_eq!(record.kind(), Some("Order"));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
