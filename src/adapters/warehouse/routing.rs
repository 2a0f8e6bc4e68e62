//! Destination routing
//!
//! Every record lands in the table named after its kind, lowercased, inside
//! the configured project and dataset.

use crate::core::transform::Record;
use crate::domain::{Result, WarehouseError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fully qualified warehouse table
///
/// Displays as `<project>:<dataset>.<table>`.
///
/// # Examples
///
/// ```
/// use ferry::adapters::warehouse::TableRef;
///
/// let table = TableRef::new("shop", "analytics", "order");
/// assert_eq!(table.to_string(), "shop:analytics.order");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableRef {
    /// Project id
    pub project: String,
    /// Dataset name
    pub dataset: String,
    /// Table name
    pub table: String,
}

impl TableRef {
    /// Creates a table reference
    pub fn new(
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}.{}", self.project, self.dataset, self.table)
    }
}

/// Destination table for a record: its `_kind`, lowercased
///
/// # Errors
///
/// Returns [`WarehouseError::InvalidTable`] if the record carries no `_kind`,
/// or if the kind contains anything other than ASCII letters, digits and `_`.
pub fn destination_for(record: &Record, project: &str, dataset: &str) -> Result<TableRef> {
    let kind = record.kind().ok_or_else(|| {
        WarehouseError::InvalidTable("record has no _kind field".to_string())
    })?;
    if !is_valid_table_name(kind) {
        return Err(WarehouseError::InvalidTable(format!(
            "kind '{kind}' is not a valid table name"
        ))
        .into());
    }
    Ok(TableRef::new(project, dataset, kind.to_lowercase()))
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
