//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Ferry using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Ferry - document-store kinds to warehouse tables
#[derive(Parser, Debug)]
#[command(name = "ferry")]
#[command(version, about, long_about = None)]
#[command(author = "Ferry Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "ferry.toml", env = "FERRY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "FERRY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export configured kinds to the warehouse
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["ferry", "export"]);
        assert_eq!(cli.config, "ferry.toml");
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["ferry", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["ferry", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_export_overrides() {
        let cli = Cli::parse_from([
            "ferry",
            "export",
            "--since-time",
            "D-2",
            "--kind",
            "Order,Product",
            "--dry-run",
            "--yes",
        ]);
        match cli.command {
            Commands::Export(args) => {
                assert_eq!(args.since_time.as_deref(), Some("D-2"));
                assert_eq!(args.kind.as_deref(), Some("Order,Product"));
                assert!(args.dry_run);
                assert!(args.yes);
            }
            other => panic!("expected export, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["ferry", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["ferry", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
