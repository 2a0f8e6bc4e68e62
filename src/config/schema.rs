//! Configuration schema types
//!
//! This module defines the configuration structure for Ferry.

use crate::core::cutoff::{CutoffSpec, DEFAULT_SINCE_TIME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Warehouse write disposition for a load job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    /// Replace the table contents
    #[default]
    WriteTruncate,
    /// Append to the table
    WriteAppend,
    /// Only write if the table is empty
    WriteEmpty,
}

impl fmt::Display for WriteDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteDisposition::WriteTruncate => "WRITE_TRUNCATE",
            WriteDisposition::WriteAppend => "WRITE_APPEND",
            WriteDisposition::WriteEmpty => "WRITE_EMPTY",
        };
        f.write_str(name)
    }
}

/// Warehouse create disposition for a load job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateDisposition {
    /// Create the table when missing
    #[default]
    CreateIfNeeded,
    /// Fail when the table is missing
    CreateNever,
}

impl fmt::Display for CreateDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CreateDisposition::CreateIfNeeded => "CREATE_IF_NEEDED",
            CreateDisposition::CreateNever => "CREATE_NEVER",
        };
        f.write_str(name)
    }
}

/// Main Ferry configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FerryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Document-store source settings
    pub source: SourceConfig,

    /// Warehouse destination settings
    pub warehouse: WarehouseConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Per-kind incremental export settings, keyed by kind name
    #[serde(default)]
    pub kinds_to_export: BTreeMap<String, KindExportConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FerryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.warehouse.validate()?;
        self.export.validate()?;

        for (kind, entry) in &self.kinds_to_export {
            entry.validate(kind)?;
            if self.export.unfiltered_kinds.contains(kind) {
                return Err(format!(
                    "Kind '{kind}' is listed in both kinds_to_export and export.unfiltered_kinds"
                ));
            }
        }

        if self.kinds_to_export.is_empty() && self.export.unfiltered_kinds.is_empty() {
            return Err(
                "No kinds to export: configure kinds_to_export or export.unfiltered_kinds"
                    .to_string(),
            );
        }

        self.logging.validate()?;
        Ok(())
    }

    /// Every kind the export covers, filtered kinds first, in sorted order
    pub fn all_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.kinds_to_export.keys().cloned().collect();
        for kind in &self.export.unfiltered_kinds {
            if !kinds.contains(kind) {
                kinds.push(kind.clone());
            }
        }
        kinds
    }

    /// Project the warehouse tables live in, defaulting to the source project
    pub fn warehouse_project(&self) -> &str {
        self.warehouse
            .project_id
            .as_deref()
            .unwrap_or(&self.source.project_id)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (read and convert, but stage nothing)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Document-store source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Project the kinds are read from
    pub project_id: String,

    /// Namespace; unset means the default namespace
    #[serde(default)]
    pub namespace: Option<String>,

    /// Directory holding one `<kind>.jsonl` dump per kind
    pub dump_dir: PathBuf,

    /// Lifetime of a cached client handle
    #[serde(default = "default_client_ttl_seconds")]
    pub client_ttl_seconds: u64,

    /// Maximum number of cached client handles
    #[serde(default = "default_client_cache_capacity")]
    pub client_cache_capacity: usize,

    /// Optional cap on entities read per kind
    #[serde(default)]
    pub query_limit: Option<usize>,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.project_id.trim().is_empty() {
            return Err("source.project_id cannot be empty".to_string());
        }

        if self.dump_dir.as_os_str().is_empty() {
            return Err("source.dump_dir cannot be empty".to_string());
        }

        if self.client_ttl_seconds == 0 {
            return Err("source.client_ttl_seconds must be > 0".to_string());
        }

        if self.client_cache_capacity == 0 {
            return Err("source.client_cache_capacity must be > 0".to_string());
        }

        if self.query_limit == Some(0) {
            return Err("source.query_limit must be > 0 when set".to_string());
        }

        Ok(())
    }
}

/// Warehouse destination configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Destination project; defaults to `source.project_id`
    #[serde(default)]
    pub project_id: Option<String>,

    /// Destination dataset
    pub dataset: String,

    /// Staging directory for load files
    pub temp_dir: PathBuf,

    /// How loads treat existing table contents
    #[serde(default)]
    pub write_disposition: WriteDisposition,

    /// Whether loads may create tables
    #[serde(default)]
    pub create_disposition: CreateDisposition,
}

impl WarehouseConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(project) = &self.project_id {
            if project.trim().is_empty() {
                return Err("warehouse.project_id cannot be empty when set".to_string());
            }
        }

        if self.dataset.trim().is_empty() {
            return Err("warehouse.dataset cannot be empty".to_string());
        }

        if !self
            .dataset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(format!(
                "Invalid warehouse.dataset '{}'. Only letters, digits and underscores are allowed",
                self.dataset
            ));
        }

        if self.temp_dir.as_os_str().is_empty() {
            return Err("warehouse.temp_dir cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Cutoff for incremental kinds: `H-<hours>`, `D-<days>` or an ISO-8601 timestamp
    #[serde(default = "default_since_time")]
    pub since_time: String,

    /// Number of kinds exported concurrently
    #[serde(default = "default_parallel_kinds")]
    pub parallel_kinds: usize,

    /// Kinds exported in full, without a cutoff filter
    #[serde(default)]
    pub unfiltered_kinds: Vec<String>,

    /// Graceful shutdown timeout in seconds (default: 30)
    /// This is the maximum time to wait for in-flight kinds to finish
    /// before forcing shutdown.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        self.since_time
            .parse::<CutoffSpec>()
            .and_then(|cutoff| cutoff.resolve_now())
            .map_err(|e| format!("export.since_time: {e}"))?;

        if self.parallel_kinds == 0 || self.parallel_kinds > 64 {
            return Err(format!(
                "export.parallel_kinds must be between 1 and 64, got {}",
                self.parallel_kinds
            ));
        }

        if let Some(kind) = self.unfiltered_kinds.iter().find(|k| k.trim().is_empty()) {
            return Err(format!(
                "export.unfiltered_kinds contains an empty kind name: '{kind}'"
            ));
        }

        Ok(())
    }

    /// Parsed cutoff specification
    ///
    /// # Errors
    ///
    /// Returns an error if `since_time` does not parse
    pub fn cutoff(&self) -> crate::domain::Result<CutoffSpec> {
        self.since_time.parse()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            since_time: default_since_time(),
            parallel_kinds: default_parallel_kinds(),
            unfiltered_kinds: Vec::new(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

/// Incremental export settings for one kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KindExportConfig {
    /// Timestamp property compared against the cutoff
    #[serde(default)]
    pub field: Option<String>,
}

impl KindExportConfig {
    /// Creates an entry filtering on `field`
    pub fn with_field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
        }
    }

    fn validate(&self, kind: &str) -> Result<(), String> {
        match self.field.as_deref() {
            None => Err(format!("kinds_to_export.{kind} is missing the 'field' key")),
            Some(field) if field.trim().is_empty() => {
                Err(format!("kinds_to_export.{kind}.field cannot be empty"))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default = "default_true")]
    pub local_enabled: bool,

    /// Local log file path
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: true,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_client_ttl_seconds() -> u64 {
    3600
}

fn default_client_cache_capacity() -> usize {
    128
}

fn default_since_time() -> String {
    DEFAULT_SINCE_TIME.to_string()
}

fn default_parallel_kinds() -> usize {
    4
}

fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_local_path() -> String {
    "/var/log/ferry".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
