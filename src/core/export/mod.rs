//! Export orchestration and batch processing
//!
//! This module provides the core export logic for Ferry, including:
//! - Per-kind conversion, routing and loading
//! - Export coordination across kinds
//! - Summary and reporting

pub mod batch;
pub mod coordinator;
pub mod summary;

pub use batch::{BatchConfig, BatchProcessor, BatchResult};
pub use coordinator::ExportCoordinator;
pub use summary::{ExportError, ExportErrorType, ExportSummary};
