//! Domain models and types for Ferry.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Key model** ([`Key`], [`IdOrName`], and the decoded [`EntKey`])
//! - **Entity model** ([`Entity`], [`EntityBuilder`], [`PropertyValue`], [`GeoPoint`])
//! - **Error types** ([`FerryError`], [`DecodeError`], [`SourceError`], [`WarehouseError`])
//! - **Result type alias** ([`Result`])
//!
//! The model is independent of any database client library. Conversions to and
//! from the client representation live in [`crate::adapters::datastore`].
//!
//! # Builder Pattern
//!
//! ```rust
//! use ferry::domain::{EntityBuilder, Key};
//! use chrono::Utc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let entity = EntityBuilder::new(Key::new(["User".into(), "alice".into()]))
//!     .property("updated_at", Utc::now())
//!     .property("visits", 3)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod errors;
pub mod key;
pub mod result;
pub mod value;

// Re-export commonly used types for convenience
pub use entity::{Entity, EntityBuilder};
pub use errors::{DecodeError, FerryError, SourceError, WarehouseError};
pub use key::{EntKey, IdOrName, Key};
pub use result::Result;
pub use value::{GeoPoint, PropertyValue};
