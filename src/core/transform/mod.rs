//! Data transformation logic
//!
//! This module turns fetched entities into flat warehouse records:
//!
//! - [`decode`] - Extracts the entity's own kind and identifier from its key
//! - [`record`] - Flattens an entity into a [`Record`] with `_key` and `_kind`

pub mod decode;
pub mod record;

pub use decode::{decode_key, decode_path};
pub use record::{canonical_timestamp, entity_to_record, Record, KEY_FIELD, KIND_FIELD};
