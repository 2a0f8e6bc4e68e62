//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "ferry.toml")]
    pub output: String,

    /// Include every option with explanatory comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Ferry configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point source.dump_dir at the directory of <Kind>.jsonl dumps");
                println!("  3. Set FERRY_PROJECT_ID in your environment or a .env file");
                println!("  4. Validate configuration: ferry validate-config");
                println!("  5. Run export: ferry export");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Ferry Configuration File
# Document store to warehouse export

[application]
log_level = "info"
dry_run = false

[source]
project_id = "${FERRY_PROJECT_ID}"
dump_dir = "./dumps"

[warehouse]
dataset = "datastore_export"
temp_dir = "/tmp/ferry"
write_disposition = "WRITE_TRUNCATE"
create_disposition = "CREATE_IF_NEEDED"

[export]
since_time = "H-48"
parallel_kinds = 4
unfiltered_kinds = []

[kinds_to_export.Order]
field = "updated_at"

[logging]
local_enabled = true
local_path = "/var/log/ferry"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Ferry Configuration File
# Document store to warehouse export
#
# This file contains all configuration options with examples and explanations.
# Any value may reference an environment variable as ${NAME}, and every key
# can be overridden with FERRY_<SECTION>_<KEY>, e.g. FERRY_EXPORT_SINCE_TIME.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (read and convert, but stage no load jobs)
dry_run = false

# ============================================================================
# Source (document store)
# ============================================================================
[source]
# Project the entities belong to
project_id = "${FERRY_PROJECT_ID}"

# Optional namespace; omit for the default namespace
# namespace = "tenant-a"

# Directory holding one <Kind>.jsonl dump per kind
dump_dir = "./dumps"

# Lifetime of cached per-scope source handles, in seconds
client_ttl_seconds = 3600

# Maximum number of cached source handles
client_cache_capacity = 128

# Optional cap on entities read per kind
# query_limit = 10000

# ============================================================================
# Warehouse
# ============================================================================
[warehouse]
# Destination project; defaults to source.project_id
# project_id = "analytics-project"

# Destination dataset (letters, digits and underscores)
dataset = "datastore_export"

# Directory where newline-delimited JSON files and load manifests are staged
temp_dir = "/tmp/ferry"

# WRITE_TRUNCATE | WRITE_APPEND | WRITE_EMPTY
write_disposition = "WRITE_TRUNCATE"

# CREATE_IF_NEEDED | CREATE_NEVER
create_disposition = "CREATE_IF_NEEDED"

# ============================================================================
# Export
# ============================================================================
[export]
# Cutoff for incremental kinds:
#   H-<hours>  e.g. "H-48"
#   D-<days>   e.g. "D-7"
#   an ISO-8601 timestamp, e.g. "2024-01-01T00:00:00Z"
since_time = "H-48"

# Number of kinds exported concurrently (1-64)
parallel_kinds = 4

# Kinds exported in full on every run
unfiltered_kinds = ["Product"]

# Seconds to wait for in-flight kinds after Ctrl+C
shutdown_timeout_secs = 30

# ============================================================================
# Incremental kinds
# ============================================================================
# Each kind is filtered on a timestamp property: only entities whose
# property is >= the cutoff are exported.
[kinds_to_export.Order]
field = "updated_at"

[kinds_to_export.Customer]
field = "modified"

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON logs to a local file
local_enabled = true

# Directory for the log file
local_path = "/var/log/ferry"

# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
