//! Entity sources
//!
//! An [`EntitySource`] executes a [`Query`] against the document store and
//! returns domain entities. [`JsonlSource`] serves queries from a directory of
//! JSON-lines dumps, one `<kind>.jsonl` file per kind, each line a client
//! entity.

use super::cache::Scope;
use super::client::ClientEntity;
use crate::core::query::Query;
use crate::domain::{Entity, FerryError, Result, SourceError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Query executor for one project/namespace scope
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Scope this source is bound to
    fn scope(&self) -> &Scope;

    /// Run a query and return every matching entity
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be executed or a stored record is
    /// malformed.
    async fn run_query(&self, query: &Query) -> Result<Vec<Entity>>;
}

/// Source backed by JSON-lines dump files
#[derive(Debug, Clone)]
pub struct JsonlSource {
    dump_dir: PathBuf,
    scope: Scope,
}

impl JsonlSource {
    /// Opens a source over `dump_dir` for `scope`
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::ConnectionFailed`] if `dump_dir` is not a directory.
    pub fn open(dump_dir: impl Into<PathBuf>, scope: Scope) -> Result<Self> {
        let dump_dir = dump_dir.into();
        if !dump_dir.is_dir() {
            return Err(SourceError::ConnectionFailed {
                scope: scope.to_string(),
                message: format!("dump directory {} does not exist", dump_dir.display()),
            }
            .into());
        }

        tracing::debug!(
            dump_dir = %dump_dir.display(),
            scope = %scope,
            "Opened JSON-lines source"
        );

        Ok(Self { dump_dir, scope })
    }

    /// Path of the dump file for `kind`
    pub fn kind_path(&self, kind: &str) -> PathBuf {
        self.dump_dir.join(format!("{kind}.jsonl"))
    }

    fn in_scope(&self, client: &ClientEntity) -> bool {
        let Some(key) = &client.key else {
            return true;
        };
        let project_ok = key
            .project
            .as_deref()
            .map_or(true, |p| p == self.scope.project);
        let namespace_ok = key.namespace.as_deref().unwrap_or("") == self.scope.namespace;
        project_ok && namespace_ok
    }
}

#[async_trait]
impl EntitySource for JsonlSource {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<Entity>> {
        let query_scope = Scope::new(query.project.clone(), query.namespace.as_deref());
        if query_scope != self.scope {
            return Err(SourceError::QueryFailed {
                kind: query.kind.clone(),
                message: format!(
                    "query scope {query_scope} does not match source scope {}",
                    self.scope
                ),
            }
            .into());
        }

        let path = self.kind_path(&query.kind);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    kind = %query.kind,
                    path = %path.display(),
                    "No dump file for kind, treating it as empty"
                );
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(SourceError::QueryFailed {
                    kind: query.kind.clone(),
                    message: format!("failed to read {}: {e}", path.display()),
                }
                .into())
            }
        };

        let mut entities = Vec::new();
        let mut skipped_out_of_scope = 0usize;

        for (index, line) in contents.lines().enumerate() {
            if query.limit.is_some_and(|limit| entities.len() >= limit) {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }

            let client = parse_line(&path, index + 1, line)?;
            if !self.in_scope(&client) {
                skipped_out_of_scope += 1;
                continue;
            }

            let entity = Entity::from_client(&client)
                .map_err(|e| invalid_record(&path, index + 1, e))?;

            if query.filters.iter().all(|filter| filter.matches(&entity)) {
                entities.push(entity);
            }
        }

        tracing::debug!(
            query = %query,
            matched = entities.len(),
            skipped_out_of_scope,
            "Query executed"
        );

        Ok(entities)
    }
}

fn parse_line(path: &Path, line_number: usize, line: &str) -> Result<ClientEntity> {
    serde_json::from_str(line).map_err(|e| invalid_record(path, line_number, e))
}

fn invalid_record(path: &Path, line: usize, error: impl std::fmt::Display) -> FerryError {
    SourceError::InvalidRecord {
        file: path.display().to_string(),
        line,
        message: error.to_string(),
    }
    .into()
}
