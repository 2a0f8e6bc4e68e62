//! Document-store adapter
//!
//! - [`client`] - Client-library representation of keys, entities and values
//! - [`convert`] - Conversions between domain and client representations
//! - [`source`] - The [`EntitySource`] query executor and its JSON-lines implementation
//! - [`cache`] - Per-scope client handle cache

pub mod cache;
pub mod client;
pub mod convert;
pub mod source;

pub use cache::{ClientCache, ClientCacheConfig, Scope};
pub use client::{ClientEntity, ClientKey, ClientValue};
pub use source::{EntitySource, JsonlSource};
