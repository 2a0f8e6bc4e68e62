//! Warehouse adapter
//!
//! - [`routing`] - Destination table for each record
//! - [`sink`] - The [`WarehouseSink`] trait and the staged-file loader

pub mod routing;
pub mod sink;

pub use routing::{destination_for, TableRef};
pub use sink::{LoadJobManifest, LoadOutcome, StagedFileLoader, WarehouseSink};
