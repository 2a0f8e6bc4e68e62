//! Client handle caching
//!
//! Opening a source client per query is wasteful when many kinds share one
//! project and namespace. Handles are cached per [`Scope`] with a fixed TTL
//! and a bounded number of entries.
//!
//! # Caching Strategy
//!
//! - Entries younger than the TTL are reused
//! - Expired entries are rebuilt on the next lookup
//! - When full, expired entries are purged first, then the oldest is evicted

use crate::domain::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Project and namespace a client handle is bound to
///
/// An unset namespace is stored as the empty string, so `None` and `""` share
/// a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Scope {
    /// Project id
    pub project: String,
    /// Namespace id, `""` for the default namespace
    pub namespace: String,
}

impl Scope {
    /// Creates a scope, normalising a missing namespace to `""`
    pub fn new(project: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            project: project.into(),
            namespace: namespace.unwrap_or_default().to_string(),
        }
    }

    /// Namespace as an option, `None` for the default namespace
    pub fn namespace(&self) -> Option<&str> {
        if self.namespace.is_empty() {
            None
        } else {
            Some(&self.namespace)
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.namespace)
    }
}

/// Configuration for the client cache.
#[derive(Debug, Clone)]
pub struct ClientCacheConfig {
    /// Time-to-live for cached handles (default: 1 hour).
    pub ttl: Duration,

    /// Maximum number of cached handles (default: 128).
    pub capacity: usize,
}

impl Default for ClientCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            capacity: 128,
        }
    }
}

impl ClientCacheConfig {
    /// Sets the cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the maximum number of entries.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }
}

struct CachedClient<T> {
    client: Arc<T>,
    created_at: Instant,
}

/// In-memory cache of client handles keyed by [`Scope`]
pub struct ClientCache<T> {
    entries: Arc<RwLock<HashMap<Scope, CachedClient<T>>>>,
    config: ClientCacheConfig,
}

impl<T> ClientCache<T> {
    /// Creates a new cache with the specified configuration.
    #[must_use]
    pub fn new(config: ClientCacheConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Creates a new cache with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ClientCacheConfig::default())
    }

    /// Returns the cached handle for `scope`, building it with `factory` when
    /// missing or expired
    ///
    /// # Errors
    ///
    /// Returns whatever error `factory` returns; nothing is cached in that case.
    pub async fn get_or_create<F>(&self, scope: &Scope, factory: F) -> Result<Arc<T>>
    where
        F: FnOnce(&Scope) -> Result<T>,
    {
        {
            let entries = self.entries.read().await;
            if let Some(cached) = entries.get(scope) {
                if cached.created_at.elapsed() < self.config.ttl {
                    return Ok(Arc::clone(&cached.client));
                }
            }
        }

        let mut entries = self.entries.write().await;

        // Another task may have refreshed the entry while we waited for the lock.
        if let Some(cached) = entries.get(scope) {
            if cached.created_at.elapsed() < self.config.ttl {
                return Ok(Arc::clone(&cached.client));
            }
        }

        let client = Arc::new(factory(scope)?);

        if !entries.contains_key(scope) && entries.len() >= self.config.capacity {
            let ttl = self.config.ttl;
            entries.retain(|_, cached| cached.created_at.elapsed() < ttl);

            if entries.len() >= self.config.capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, cached)| cached.created_at)
                    .map(|(scope, _)| scope.clone());
                if let Some(oldest) = oldest {
                    tracing::debug!(scope = %oldest, "Evicting oldest cached client");
                    entries.remove(&oldest);
                }
            }
        }

        tracing::debug!(scope = %scope, "Created source client");
        entries.insert(
            scope.clone(),
            CachedClient {
                client: Arc::clone(&client),
                created_at: Instant::now(),
            },
        );

        Ok(client)
    }

    /// Number of cached entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drops every cached handle
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
