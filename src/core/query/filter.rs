//! Per-kind timestamp filters
//!
//! Each exported kind may name a timestamp property; only entities whose
//! property is at or after the cutoff time are selected.

use crate::config::schema::KindExportConfig;
use crate::domain::value::PropertyValue;
use crate::domain::{Entity, FerryError, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Comparison operator of a property filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    LessThan,
    LessThanOrEqual,
    Equal,
    GreaterThanOrEqual,
    GreaterThan,
}

impl FilterOp {
    /// Operator symbol as used by the query layer
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::LessThan => "<",
            FilterOp::LessThanOrEqual => "<=",
            FilterOp::Equal => "=",
            FilterOp::GreaterThanOrEqual => ">=",
            FilterOp::GreaterThan => ">",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            FilterOp::LessThan => ordering == Ordering::Less,
            FilterOp::LessThanOrEqual => ordering != Ordering::Greater,
            FilterOp::Equal => ordering == Ordering::Equal,
            FilterOp::GreaterThanOrEqual => ordering != Ordering::Less,
            FilterOp::GreaterThan => ordering == Ordering::Greater,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single `(field, op, value)` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFilter {
    /// Property name
    pub field: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Value to compare against
    pub value: PropertyValue,
}

impl PropertyFilter {
    /// Creates a new filter
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<PropertyValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Whether `entity` satisfies this predicate
    ///
    /// An entity without the property never matches, and neither does a value
    /// of a different type than the filter's.
    pub fn matches(&self, entity: &Entity) -> bool {
        entity
            .get(&self.field)
            .and_then(|value| compare_values(value, &self.value))
            .is_some_and(|ordering| self.op.accepts(ordering))
    }
}

fn compare_values(left: &PropertyValue, right: &PropertyValue) -> Option<Ordering> {
    match (left, right) {
        (PropertyValue::Timestamp(a), PropertyValue::Timestamp(b)) => Some(a.cmp(b)),
        (PropertyValue::Integer(a), PropertyValue::Integer(b)) => Some(a.cmp(b)),
        (PropertyValue::Double(a), PropertyValue::Double(b)) => a.partial_cmp(b),
        (PropertyValue::String(a), PropertyValue::String(b)) => Some(a.cmp(b)),
        (PropertyValue::Boolean(a), PropertyValue::Boolean(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

impl fmt::Display for PropertyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {:?})", self.field, self.op, self.value)
    }
}

/// Filtering information for one kind
#[derive(Debug, Clone, PartialEq)]
pub struct EntityFilters {
    /// Name of the timestamp property
    pub field_name: String,
    /// Cutoff time; entities modified before it are skipped
    pub since_time: DateTime<Utc>,
}

impl EntityFilters {
    /// Creates filtering information for one kind
    pub fn new(field_name: impl Into<String>, since_time: DateTime<Utc>) -> Self {
        Self {
            field_name: field_name.into(),
            since_time,
        }
    }

    /// Filter list for the query layer: `[(field_name, ">=", since_time)]`
    pub fn get_filter(&self) -> Vec<PropertyFilter> {
        vec![PropertyFilter::new(
            self.field_name.clone(),
            FilterOp::GreaterThanOrEqual,
            self.since_time,
        )]
    }
}

/// Build filters for every configured kind, all sharing the same cutoff
///
/// # Errors
///
/// Returns a configuration error if any kind's entry lacks the `field` key.
///
/// # Examples
///
/// ```
/// use ferry::config::schema::KindExportConfig;
/// use ferry::core::query::filter::get_entity_filters;
/// use chrono::Utc;
/// use std::collections::BTreeMap;
///
/// let mut kinds = BTreeMap::new();
/// kinds.insert("User".to_string(), KindExportConfig::with_field("updated_at"));
///
/// let filters = get_entity_filters(&kinds, Utc::now()).unwrap();
/// assert_eq!(filters["User"].field_name, "updated_at");
/// ```
pub fn get_entity_filters(
    kinds: &BTreeMap<String, KindExportConfig>,
    since_time: DateTime<Utc>,
) -> Result<BTreeMap<String, EntityFilters>> {
    let mut filters = BTreeMap::new();

    for (kind, entry) in kinds {
        let field = entry.field.as_deref().ok_or_else(|| {
            FerryError::Configuration(format!(
                "kinds_to_export.{kind} is missing the 'field' key"
            ))
        })?;
        filters.insert(kind.clone(), EntityFilters::new(field, since_time));
    }

    tracing::debug!(
        kinds = filters.len(),
        since_time = %since_time,
        "Built entity filters"
    );

    Ok(filters)
}
