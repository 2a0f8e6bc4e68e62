//! Configuration management for Ferry.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! Ferry uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `FERRY_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ferry::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ferry.toml")?;
//!
//! println!("Source project: {}", config.source.project_id);
//! println!("Dataset: {}", config.warehouse.dataset);
//! for (kind, entry) in &config.kinds_to_export {
//!     println!("{kind} filtered on {:?}", entry.field);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`SourceConfig`] - Document-store project, namespace and dump location
//! - [`WarehouseConfig`] - Destination dataset, staging directory, dispositions
//! - [`ExportConfig`] - Cutoff, concurrency and unfiltered kinds
//! - [`KindExportConfig`] - Per-kind timestamp field (`[kinds_to_export.<Kind>]`)
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! project_id = "${FERRY_PROJECT}"
//! dump_dir = "/data/datastore"
//!
//! [warehouse]
//! dataset = "datastore_export"
//! temp_dir = "/tmp/ferry"
//!
//! [export]
//! since_time = "H-48"
//! unfiltered_kinds = ["Product"]
//!
//! [kinds_to_export.Order]
//! field = "updated_at"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, CreateDisposition, ExportConfig, FerryConfig, KindExportConfig,
    LoggingConfig, SourceConfig, WarehouseConfig, WriteDisposition,
};
