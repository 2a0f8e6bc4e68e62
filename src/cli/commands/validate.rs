//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Ferry configuration file.

use crate::config::{load_config, FerryConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading already validates; a failure here is a config error either way
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        match config.validate() {
            Ok(()) => {
                println!("✅ Configuration is valid");
                println!();
                print_config_summary(&config);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }
}

fn print_config_summary(config: &FerryConfig) {
    println!("Configuration Summary:");
    println!("  Log Level: {}", config.application.log_level);
    println!("  Dry Run: {}", config.application.dry_run);
    println!("  Source Project: {}", config.source.project_id);
    println!(
        "  Source Namespace: {}",
        config.source.namespace.as_deref().unwrap_or("(default)")
    );
    println!("  Dump Directory: {}", config.source.dump_dir.display());
    println!(
        "  Destination: {}:{}",
        config.warehouse_project(),
        config.warehouse.dataset
    );
    println!("  Staging Directory: {}", config.warehouse.temp_dir.display());
    println!("  Write Disposition: {}", config.warehouse.write_disposition);
    println!("  Create Disposition: {}", config.warehouse.create_disposition);
    println!("  Since Time: {}", config.export.since_time);
    println!("  Parallel Kinds: {}", config.export.parallel_kinds);
    println!("  Kinds:");
    for (kind, entry) in &config.kinds_to_export {
        println!(
            "    - {kind} (filtered on {})",
            entry.field.as_deref().unwrap_or("?")
        );
    }
    for kind in &config.export.unfiltered_kinds {
        println!("    - {kind} (full scan)");
    }
    println!();
}
