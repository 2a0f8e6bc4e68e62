// Ferry - Document store to warehouse export tool
// Copyright (c) 2025 Ferry Contributors
// Licensed under the MIT License

use clap::Parser;
use ferry::cli::{Cli, Commands};
use ferry::config::{load_config, LoggingConfig};
use ferry::logging::init_logging;
use std::process;
use tokio::sync::watch;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // File logging follows the config file when it loads; otherwise console only
    let (config_level, logging_config) = match &cli.command {
        Commands::Init(_) => (None, console_only()),
        _ => match load_config(&cli.config) {
            Ok(config) => (Some(config.application.log_level), config.logging),
            Err(_) => (None, console_only()),
        },
    };
    let log_level = cli
        .log_level
        .clone()
        .or(config_level)
        .unwrap_or_else(|| "info".to_string());

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Ferry - document store to warehouse export"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(listen_for_shutdown(shutdown_tx));

    let exit_code = match execute_command(&cli, shutdown_rx).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // process::exit skips destructors
    drop(logging_guard);
    process::exit(exit_code);
}

fn console_only() -> LoggingConfig {
    LoggingConfig {
        local_enabled: false,
        ..LoggingConfig::default()
    }
}

/// Flip the shutdown flag on SIGINT or SIGTERM
async fn listen_for_shutdown(shutdown_tx: watch::Sender<bool>) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, listening for Ctrl+C only");
                wait_for_ctrl_c(shutdown_tx).await;
                return;
            }
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
            }
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown...");
            }
        }
        println!("\n⚠️  Shutdown signal received, finishing in-flight kinds...");
        let _ = shutdown_tx.send(true);
    }

    #[cfg(not(unix))]
    wait_for_ctrl_c(shutdown_tx).await;
}

async fn wait_for_ctrl_c(shutdown_tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown...");
    println!("\n⚠️  Shutdown signal received, finishing in-flight kinds...");
    let _ = shutdown_tx.send(true);
}

async fn execute_command(cli: &Cli, shutdown_signal: watch::Receiver<bool>) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Export(args) => args.execute(&cli.config, shutdown_signal).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
