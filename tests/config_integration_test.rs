//! Integration tests for configuration loading and validation
//!
//! Tests that modify environment variables hold `ENV_MUTEX` so they do not
//! interfere with each other.

use ferry::config::{load_config, CreateDisposition, WriteDisposition};
use ferry::domain::FerryError;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

const OVERRIDE_VARS: &[&str] = &[
    "FERRY_APPLICATION_LOG_LEVEL",
    "FERRY_APPLICATION_DRY_RUN",
    "FERRY_SOURCE_NAMESPACE",
    "FERRY_WAREHOUSE_WRITE_DISPOSITION",
    "FERRY_EXPORT_SINCE_TIME",
    "FERRY_EXPORT_PARALLEL_KINDS",
    "FERRY_EXPORT_UNFILTERED_KINDS",
    "TEST_FERRY_PROJECT",
];

fn cleanup_env_vars() {
    for var in OVERRIDE_VARS {
        std::env::remove_var(var);
    }
}

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const COMPLETE_TOML: &str = r#"
[application]
log_level = "debug"
dry_run = true

[source]
project_id = "shop"
namespace = "eu"
dump_dir = "/data/dumps"
client_ttl_seconds = 600
client_cache_capacity = 16
query_limit = 5000

[warehouse]
project_id = "analytics-project"
dataset = "datastore_export"
temp_dir = "/tmp/ferry"
write_disposition = "WRITE_APPEND"
create_disposition = "CREATE_NEVER"

[export]
since_time = "D-7"
parallel_kinds = 8
unfiltered_kinds = ["Product", "Category"]
shutdown_timeout_secs = 10

[kinds_to_export.Order]
field = "updated_at"

[kinds_to_export.Customer]
field = "modified"

[logging]
local_enabled = false
local_path = "/tmp/ferry-logs"
local_rotation = "hourly"
"#;

const MINIMAL_TOML: &str = r#"
[source]
project_id = "shop"
dump_dir = "/data/dumps"

[warehouse]
dataset = "datastore_export"
temp_dir = "/tmp/ferry"

[kinds_to_export.Order]
field = "updated_at"
"#;

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = config_file(COMPLETE_TOML);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.source.namespace.as_deref(), Some("eu"));
    assert_eq!(config.source.client_ttl_seconds, 600);
    assert_eq!(config.source.client_cache_capacity, 16);
    assert_eq!(config.source.query_limit, Some(5000));
    assert_eq!(config.warehouse_project(), "analytics-project");
    assert_eq!(config.warehouse.write_disposition, WriteDisposition::WriteAppend);
    assert_eq!(config.warehouse.create_disposition, CreateDisposition::CreateNever);
    assert_eq!(config.export.parallel_kinds, 8);
    assert_eq!(config.export.shutdown_timeout_secs, 10);
    assert_eq!(
        config.all_kinds(),
        vec!["Customer", "Order", "Product", "Category"]
    );
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = config_file(MINIMAL_TOML);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.source.namespace, None);
    assert_eq!(config.source.client_ttl_seconds, 3600);
    assert_eq!(config.source.client_cache_capacity, 128);
    assert_eq!(config.warehouse_project(), "shop");
    assert_eq!(config.warehouse.write_disposition, WriteDisposition::WriteTruncate);
    assert_eq!(config.export.since_time, "H-48");
    assert_eq!(config.export.parallel_kinds, 4);
    assert!(config.logging.local_enabled);
}

#[test]
fn test_env_overrides_take_precedence() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("FERRY_APPLICATION_LOG_LEVEL", "warn");
    std::env::set_var("FERRY_SOURCE_NAMESPACE", "us");
    std::env::set_var("FERRY_WAREHOUSE_WRITE_DISPOSITION", "write_empty");
    std::env::set_var("FERRY_EXPORT_SINCE_TIME", "2024-01-01");
    std::env::set_var("FERRY_EXPORT_UNFILTERED_KINDS", "Product, Category");

    let file = config_file(MINIMAL_TOML);
    let result = load_config(file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.application.log_level, "warn");
    assert_eq!(config.source.namespace.as_deref(), Some("us"));
    assert_eq!(config.warehouse.write_disposition, WriteDisposition::WriteEmpty);
    assert_eq!(config.export.since_time, "2024-01-01");
    assert_eq!(config.export.unfiltered_kinds, vec!["Product", "Category"]);
}

#[test]
fn test_invalid_env_override_is_config_error() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("FERRY_EXPORT_PARALLEL_KINDS", "many");
    let file = config_file(MINIMAL_TOML);
    let result = load_config(file.path());
    cleanup_env_vars();

    assert!(matches!(result, Err(FerryError::Configuration(_))));
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    std::env::set_var("TEST_FERRY_PROJECT", "substituted");
    let file = config_file(&MINIMAL_TOML.replace("\"shop\"", "\"${TEST_FERRY_PROJECT}\""));
    let result = load_config(file.path());
    cleanup_env_vars();

    assert_eq!(result.unwrap().source.project_id, "substituted");
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = config_file(&MINIMAL_TOML.replace("\"shop\"", "\"${TEST_FERRY_PROJECT}\""));
    let err = load_config(file.path()).unwrap_err();

    assert!(err.to_string().contains("TEST_FERRY_PROJECT"));
}

#[test]
fn test_kind_without_field_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let file = config_file(&MINIMAL_TOML.replace("field = \"updated_at\"", ""));
    let err = load_config(file.path()).unwrap_err();

    assert!(err
        .to_string()
        .contains("kinds_to_export.Order is missing the 'field' key"));
}

#[test]
fn test_invalid_since_time_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let toml = format!("{MINIMAL_TOML}\n[export]\nsince_time = \"H-abc\"\n");
    let file = config_file(&toml);

    assert!(matches!(
        load_config(file.path()),
        Err(FerryError::Configuration(_))
    ));
}

#[test]
fn test_missing_file() {
    let err = load_config("/nonexistent/ferry.toml").unwrap_err();
    assert!(err.to_string().contains("Configuration file not found"));
}
