//! Per-kind query construction

use super::filter::{EntityFilters, PropertyFilter};
use std::collections::BTreeMap;
use std::fmt;

/// Scoped query descriptor
///
/// Pure data: executing it is the job of an
/// [`EntitySource`](crate::adapters::datastore::EntitySource).
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Kind to scan
    pub kind: String,
    /// Project the kind lives in
    pub project: String,
    /// Namespace; `None` means the default namespace
    pub namespace: Option<String>,
    /// Predicates, all of which must hold
    pub filters: Vec<PropertyFilter>,
    /// Maximum number of entities to return
    pub limit: Option<usize>,
}

impl Query {
    /// Creates an unfiltered query over a kind
    pub fn new(kind: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            project: project.into(),
            namespace: None,
            filters: Vec::new(),
            limit: None,
        }
    }

    /// Sets the namespace
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Sets the result limit
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Whether this query scans the whole kind
    pub fn is_full_scan(&self) -> bool {
        self.filters.is_empty()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query(kind={}, project={}, namespace={}",
            self.kind,
            self.project,
            self.namespace.as_deref().unwrap_or("")
        )?;
        for filter in &self.filters {
            write!(f, ", filter={filter}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, ", limit={limit}")?;
        }
        write!(f, ")")
    }
}

/// Create the load query for one kind
///
/// Kinds with a configured filter get its predicate list; any other kind is a
/// full scan.
///
/// # Examples
///
/// ```
/// use ferry::core::query::builder::create_entities_load_query;
/// use ferry::core::query::filter::EntityFilters;
/// use chrono::Utc;
/// use std::collections::BTreeMap;
///
/// let mut filtering = BTreeMap::new();
/// filtering.insert("User".to_string(), EntityFilters::new("updated_at", Utc::now()));
///
/// let users = create_entities_load_query("User", "shop", &filtering);
/// assert_eq!(users.filters.len(), 1);
///
/// let channels = create_entities_load_query("Channel", "shop", &filtering);
/// assert!(channels.is_full_scan());
/// ```
pub fn create_entities_load_query(
    kind: &str,
    project_id: &str,
    entity_filtering: &BTreeMap<String, EntityFilters>,
) -> Query {
    let mut query = Query::new(kind, project_id);
    if let Some(filtering) = entity_filtering.get(kind) {
        query.filters = filtering.get_filter();
    }

    tracing::info!(kind = %kind, query = %query, "Created load query");

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::filter::FilterOp;
    use chrono::{TimeZone, Utc};

    fn filtering() -> BTreeMap<String, EntityFilters> {
        let cutoff = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut filtering = BTreeMap::new();
        filtering.insert("User".to_string(), EntityFilters::new("updated_at", cutoff));
        filtering
    }

    #[test]
    fn test_filtered_kind() {
        let query = create_entities_load_query("User", "shop", &filtering());

        assert_eq!(query.kind, "User");
        assert_eq!(query.project, "shop");
        assert_eq!(query.filters, filtering()["User"].get_filter());
        assert_eq!(query.filters[0].op, FilterOp::GreaterThanOrEqual);
    }

    #[test]
    fn test_unfiltered_kind_is_full_scan() {
        let query = create_entities_load_query("Channel", "shop", &filtering());
        assert!(query.is_full_scan());
        assert!(query.namespace.is_none());
    }

    #[test]
    fn test_query_display() {
        let query = Query::new("Order", "shop").with_limit(Some(10));
        assert_eq!(
            query.to_string(),
            "Query(kind=Order, project=shop, namespace=, limit=10)"
        );
    }
}
