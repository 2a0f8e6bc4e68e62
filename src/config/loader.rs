//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CreateDisposition, FerryConfig, WriteDisposition};
use crate::domain::errors::FerryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into FerryConfig
/// 4. Applies environment variable overrides (FERRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use ferry::config::loader::load_config;
///
/// let config = load_config("ferry.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<FerryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(FerryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        FerryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let config = parse_config(&contents)?;

    tracing::debug!(
        path = %path.display(),
        kinds = config.kinds_to_export.len(),
        unfiltered_kinds = config.export.unfiltered_kinds.len(),
        "Configuration loaded"
    );

    Ok(config)
}

/// Parses configuration text, applying substitution, overrides and validation
///
/// # Errors
///
/// Returns an error if substitution, parsing, an override or validation fails
pub fn parse_config(contents: &str) -> Result<FerryConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: FerryConfig = toml::from_str(&contents)
        .map_err(|e| FerryError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    config.validate().map_err(|e| {
        FerryError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| FerryError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(FerryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        FerryError::Configuration(format!("Invalid value '{value}' for {name}: {e}"))
    })
}

fn parse_write_disposition(name: &str, value: &str) -> Result<WriteDisposition> {
    match value.trim().to_ascii_uppercase().as_str() {
        "WRITE_TRUNCATE" => Ok(WriteDisposition::WriteTruncate),
        "WRITE_APPEND" => Ok(WriteDisposition::WriteAppend),
        "WRITE_EMPTY" => Ok(WriteDisposition::WriteEmpty),
        _ => Err(FerryError::Configuration(format!(
            "Invalid value '{value}' for {name}. Must be one of: WRITE_TRUNCATE, WRITE_APPEND, WRITE_EMPTY"
        ))),
    }
}

fn parse_create_disposition(name: &str, value: &str) -> Result<CreateDisposition> {
    match value.trim().to_ascii_uppercase().as_str() {
        "CREATE_IF_NEEDED" => Ok(CreateDisposition::CreateIfNeeded),
        "CREATE_NEVER" => Ok(CreateDisposition::CreateNever),
        _ => Err(FerryError::Configuration(format!(
            "Invalid value '{value}' for {name}. Must be one of: CREATE_IF_NEEDED, CREATE_NEVER"
        ))),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Applies environment variable overrides using FERRY_* prefix
///
/// Variables follow the pattern `FERRY_<SECTION>_<KEY>`, for example
/// `FERRY_SOURCE_PROJECT_ID` or `FERRY_EXPORT_SINCE_TIME`. List values are
/// comma separated.
fn apply_env_overrides<F>(config: &mut FerryConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    // Application overrides
    if let Some(val) = lookup("FERRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = lookup("FERRY_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("FERRY_APPLICATION_DRY_RUN", &val)?;
    }

    // Source overrides
    if let Some(val) = lookup("FERRY_SOURCE_PROJECT_ID") {
        config.source.project_id = val;
    }
    if let Some(val) = lookup("FERRY_SOURCE_NAMESPACE") {
        config.source.namespace = Some(val).filter(|ns| !ns.is_empty());
    }
    if let Some(val) = lookup("FERRY_SOURCE_DUMP_DIR") {
        config.source.dump_dir = PathBuf::from(val);
    }
    if let Some(val) = lookup("FERRY_SOURCE_CLIENT_TTL_SECONDS") {
        config.source.client_ttl_seconds = parse_override("FERRY_SOURCE_CLIENT_TTL_SECONDS", &val)?;
    }
    if let Some(val) = lookup("FERRY_SOURCE_CLIENT_CACHE_CAPACITY") {
        config.source.client_cache_capacity =
            parse_override("FERRY_SOURCE_CLIENT_CACHE_CAPACITY", &val)?;
    }
    if let Some(val) = lookup("FERRY_SOURCE_QUERY_LIMIT") {
        config.source.query_limit = Some(parse_override("FERRY_SOURCE_QUERY_LIMIT", &val)?);
    }

    // Warehouse overrides
    if let Some(val) = lookup("FERRY_WAREHOUSE_PROJECT_ID") {
        config.warehouse.project_id = Some(val);
    }
    if let Some(val) = lookup("FERRY_WAREHOUSE_DATASET") {
        config.warehouse.dataset = val;
    }
    if let Some(val) = lookup("FERRY_WAREHOUSE_TEMP_DIR") {
        config.warehouse.temp_dir = PathBuf::from(val);
    }
    if let Some(val) = lookup("FERRY_WAREHOUSE_WRITE_DISPOSITION") {
        config.warehouse.write_disposition =
            parse_write_disposition("FERRY_WAREHOUSE_WRITE_DISPOSITION", &val)?;
    }
    if let Some(val) = lookup("FERRY_WAREHOUSE_CREATE_DISPOSITION") {
        config.warehouse.create_disposition =
            parse_create_disposition("FERRY_WAREHOUSE_CREATE_DISPOSITION", &val)?;
    }

    // Export overrides
    if let Some(val) = lookup("FERRY_EXPORT_SINCE_TIME") {
        config.export.since_time = val;
    }
    if let Some(val) = lookup("FERRY_EXPORT_PARALLEL_KINDS") {
        config.export.parallel_kinds = parse_override("FERRY_EXPORT_PARALLEL_KINDS", &val)?;
    }
    if let Some(val) = lookup("FERRY_EXPORT_UNFILTERED_KINDS") {
        config.export.unfiltered_kinds = split_list(&val);
    }
    if let Some(val) = lookup("FERRY_EXPORT_SHUTDOWN_TIMEOUT_SECS") {
        config.export.shutdown_timeout_secs =
            parse_override("FERRY_EXPORT_SHUTDOWN_TIMEOUT_SECS", &val)?;
    }

    // Logging overrides
    if let Some(val) = lookup("FERRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("FERRY_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = lookup("FERRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = lookup("FERRY_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
