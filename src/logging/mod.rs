//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - JSON-formatted file logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use ferry::logging::init_logging;
//! use ferry::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an export run
///
/// # Example
///
/// ```no_run
/// use ferry::log_export_start;
/// use chrono::Utc;
///
/// log_export_start!(3, Utc::now());
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($kinds:expr, $since_time:expr) => {
        tracing::info!(
            kinds = $kinds,
            since_time = %$since_time,
            "Starting export"
        );
    };
}

/// Log the completion of an export run
///
/// # Example
///
/// ```no_run
/// use ferry::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(42, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($count:expr, $duration:expr) => {
        tracing::info!(
            count = $count,
            duration_ms = $duration.as_millis() as u64,
            "Export completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use ferry::log_error_with_context;
/// use ferry::domain::FerryError;
///
/// let error = FerryError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}

/// Log the load of one table's records
///
/// # Example
///
/// ```no_run
/// use ferry::log_batch_processing;
///
/// log_batch_processing!("Order", "shop:analytics.order", 1000);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($kind:expr, $table:expr, $rows:expr) => {
        tracing::debug!(
            kind = %$kind,
            table = %$table,
            rows = $rows,
            "Loading table"
        );
    };
}
