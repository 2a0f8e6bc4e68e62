//! Integration tests for the CLI commands
//!
//! Commands are executed in-process and checked through their exit codes.

use clap::Parser;
use ferry::cli::commands::export::ExportArgs;
use ferry::cli::commands::init::InitArgs;
use ferry::cli::commands::validate::ValidateArgs;
use ferry::cli::{Cli, Commands};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::sync::watch;

struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("dumps")).unwrap();
        fs::write(
            root.path().join("dumps").join("Product.jsonl"),
            r#"{"key":{"path":["Product","widget"]},"properties":{"price":{"integerValue":5}}}
"#,
        )
        .unwrap();
        Self { root }
    }

    fn staging(&self) -> PathBuf {
        self.root.path().join("staging")
    }

    fn write_config(&self, extra: &str) -> String {
        let path = self.root.path().join("ferry.toml");
        fs::write(
            &path,
            format!(
                r#"
[source]
project_id = "shop"
dump_dir = "{}"

[warehouse]
dataset = "analytics"
temp_dir = "{}"

[export]
unfiltered_kinds = ["Product"]

[logging]
local_enabled = false
{extra}
"#,
                self.root.path().join("dumps").display(),
                self.staging().display()
            ),
        )
        .unwrap();
        path.to_string_lossy().to_string()
    }
}

fn export_args(kind: Option<&str>, dry_run: bool) -> ExportArgs {
    ExportArgs {
        yes: true,
        dry_run,
        since_time: None,
        kind: kind.map(String::from),
    }
}

#[test]
fn test_cli_parses_export_flags() {
    let cli = Cli::try_parse_from([
        "ferry",
        "--config",
        "custom.toml",
        "export",
        "--since-time",
        "D-2",
        "--kind",
        "Order,Product",
        "--dry-run",
        "--yes",
    ])
    .unwrap();

    assert_eq!(cli.config, "custom.toml");
    match cli.command {
        Commands::Export(args) => {
            assert_eq!(args.since_time.as_deref(), Some("D-2"));
            assert_eq!(
                args.requested_kinds(),
                Some(vec!["Order".to_string(), "Product".to_string()])
            );
            assert!(args.dry_run);
            assert!(args.yes);
        }
        other => panic!("expected export command, got {other:?}"),
    }
}

#[tokio::test]
async fn test_export_command_succeeds() {
    let workspace = Workspace::new();
    let config = workspace.write_config("");
    let (_tx, rx) = watch::channel(false);

    let code = export_args(None, false).execute(&config, rx).await.unwrap();

    assert_eq!(code, 0);
    assert!(workspace.staging().exists());
}

#[tokio::test]
async fn test_export_command_dry_run_stages_nothing() {
    let workspace = Workspace::new();
    let config = workspace.write_config("");
    let (_tx, rx) = watch::channel(false);

    let code = export_args(None, true).execute(&config, rx).await.unwrap();

    assert_eq!(code, 0);
    assert!(!workspace.staging().exists());
}

#[tokio::test]
async fn test_export_command_unknown_kind_is_config_error() {
    let workspace = Workspace::new();
    let config = workspace.write_config("");
    let (_tx, rx) = watch::channel(false);

    let code = export_args(Some("Ghost"), false)
        .execute(&config, rx)
        .await
        .unwrap();

    assert_eq!(code, 2);
}

#[tokio::test]
async fn test_export_command_invalid_since_time_is_config_error() {
    let workspace = Workspace::new();
    let config = workspace.write_config("");
    let (_tx, rx) = watch::channel(false);

    let mut args = export_args(None, true);
    args.since_time = Some("yesterday".to_string());

    assert_eq!(args.execute(&config, rx).await.unwrap(), 2);
}

#[tokio::test]
async fn test_export_command_partial_failure() {
    let workspace = Workspace::new();
    fs::write(
        workspace.root.path().join("dumps").join("Order.jsonl"),
        "{broken\n",
    )
    .unwrap();
    let config = workspace.write_config("[kinds_to_export.Order]\nfield = \"updated_at\"\n");
    let (_tx, rx) = watch::channel(false);

    let code = export_args(None, false).execute(&config, rx).await.unwrap();

    assert_eq!(code, 1);
}

#[tokio::test]
async fn test_export_command_interrupted() {
    let workspace = Workspace::new();
    let config = workspace.write_config("");
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let code = export_args(None, false).execute(&config, rx).await.unwrap();

    assert_eq!(code, 130);
}

#[tokio::test]
async fn test_export_command_missing_config() {
    let (_tx, rx) = watch::channel(false);
    let code = export_args(None, false)
        .execute("/nonexistent/ferry.toml", rx)
        .await
        .unwrap();

    assert_eq!(code, 2);
}

#[tokio::test]
async fn test_init_then_validate() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("ferry.toml");

    let init = InitArgs {
        output: output.to_string_lossy().to_string(),
        with_examples: false,
        force: false,
    };
    assert_eq!(init.execute().await.unwrap(), 0);

    // The template references ${FERRY_PROJECT_ID}
    std::env::set_var("FERRY_PROJECT_ID", "shop");
    let code = ValidateArgs {}
        .execute(&output.to_string_lossy())
        .await
        .unwrap();
    assert_eq!(code, 0);
}
