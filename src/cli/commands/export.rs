//! Export command implementation
//!
//! This module implements the `export` command for exporting document-store
//! kinds to warehouse tables.

use crate::config::load_config;
use crate::core::cutoff::CutoffSpec;
use crate::core::export::{ExportCoordinator, ExportSummary};
use clap::Args;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - read and convert without staging any load
    #[arg(long)]
    pub dry_run: bool,

    /// Override the cutoff (H-<hours>, D-<days> or an ISO-8601 timestamp)
    #[arg(long)]
    pub since_time: Option<String>,

    /// Restrict the export to these kinds (comma-separated)
    #[arg(long)]
    pub kind: Option<String>,
}

impl ExportArgs {
    /// Kinds requested with `--kind`, if any
    pub fn requested_kinds(&self) -> Option<Vec<String>> {
        self.kind.as_ref().map(|kinds| {
            kinds
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        // Apply CLI overrides
        if let Some(since_time) = &self.since_time {
            tracing::info!(since_time = %since_time, "Overriding since_time from CLI");
            config.export.since_time = since_time.clone();
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let dry_run = config.application.dry_run;
        let shutdown_timeout_secs = config.export.shutdown_timeout_secs;
        let cutoff: CutoffSpec = config.export.cutoff()?;
        let dataset = config.warehouse.dataset.clone();
        let project = config.warehouse_project().to_string();

        let mut coordinator = ExportCoordinator::new(config, shutdown_signal.clone());
        if let Some(kinds) = self.requested_kinds() {
            tracing::info!(kinds = ?kinds, "Restricting kinds from CLI");
            coordinator = coordinator.with_kinds(kinds);
        }

        let kinds = match coordinator.selected_kinds() {
            Ok(kinds) => kinds,
            Err(e) => {
                tracing::error!(error = %e, "Invalid kind selection");
                eprintln!("{e}");
                return Ok(2);
            }
        };

        if dry_run {
            tracing::info!("Dry run mode enabled - no load jobs will be staged");
            println!("🔍 DRY RUN MODE - No load jobs will be staged");
            println!();
        }

        // Confirmation prompt (unless --yes or dry-run)
        if !self.yes && !dry_run {
            println!("Export Configuration:");
            println!("  Since: {cutoff} ({})", cutoff.resolve_now()?.to_rfc3339());
            println!("  Kinds: {kinds:?}");
            println!("  Destination: {project}:{dataset}");
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        println!("🚀 Starting export...");
        println!();

        // The timeout only starts once a shutdown signal is received;
        // normal exports can run indefinitely.
        let timeout = Duration::from_secs(shutdown_timeout_secs);
        let export = coordinator.execute_export();
        tokio::pin!(export);

        let summary = tokio::select! {
            result = &mut export => match result {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::error!(error = %e, "Export failed");
                    eprintln!("Export failed: {e}");
                    return Ok(5); // Fatal error exit code
                }
            },
            _ = shutdown_deadline(shutdown_signal, timeout) => {
                tracing::warn!(
                    timeout_secs = shutdown_timeout_secs,
                    "In-flight kinds did not finish within the shutdown timeout"
                );
                eprintln!("⚠️  Shutdown timeout reached, aborting in-flight kinds");
                return Ok(130);
            }
        };

        print_summary(&summary);

        let exit_code = if summary.interrupted {
            println!("⚠️  Export interrupted. Kinds not started: {}", summary.kinds_skipped);
            tracing::info!("Export interrupted by user signal");
            130 // SIGINT exit code (standard Unix convention)
        } else if summary.is_successful() {
            println!("✅ Export completed successfully!");
            0
        } else {
            println!("⚠️  Export completed with failures");
            1 // Partial success
        };

        Ok(exit_code)
    }
}

/// Resolves `timeout` after the shutdown signal fires; never resolves otherwise
async fn shutdown_deadline(mut shutdown_signal: watch::Receiver<bool>, timeout: Duration) {
    while !*shutdown_signal.borrow_and_update() {
        if shutdown_signal.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
    tokio::time::sleep(timeout).await;
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("📊 Export Summary:");
    println!("  Kinds Processed: {}", summary.kinds_processed);
    println!("  Entities Read: {}", summary.entities_read);
    println!("  Records Loaded: {}", summary.records_loaded);
    println!("  Failed: {}", summary.failed_records);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    if !summary.tables.is_empty() {
        println!("  Tables:");
        for table in &summary.tables {
            println!("    - {table}");
        }
    }
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in summary.errors.iter().take(10) {
            println!("  - {:?}: {}", error.error_type, error.message);
            if let Some(context) = &error.context {
                println!("    Context: {context}");
            }
        }
        if summary.errors.len() > 10 {
            println!("  ... and {} more errors", summary.errors.len() - 10);
        }
        println!();
    }
}
