//! Query construction
//!
//! - [`filter`] - Timestamp cutoff filters per kind
//! - [`builder`] - Scoped query descriptors per kind

pub mod builder;
pub mod filter;

pub use builder::{create_entities_load_query, Query};
pub use filter::{get_entity_filters, EntityFilters, FilterOp, PropertyFilter};
