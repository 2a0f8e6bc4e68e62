//! External system integrations for Ferry.
//!
//! - [`datastore`] - document-store client types, conversions, the entity
//!   source and the per-scope client cache
//! - [`warehouse`] - table routing and bulk-load sinks
//!
//! Both sides sit behind traits ([`datastore::EntitySource`] and
//! [`warehouse::WarehouseSink`]) so the export pipeline can be driven by
//! mock implementations in tests.

pub mod datastore;
pub mod warehouse;
