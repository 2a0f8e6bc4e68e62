//! Property values
//!
//! The typed value model of entity properties.

use super::entity::Entity;
use super::key::Key;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geographic point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new point
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Value of an entity property
///
/// `Map` holds embedded entities that carry no key of their own.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    GeoPoint(GeoPoint),
    Key(Key),
    Entity(Box<Entity>),
    Map(BTreeMap<String, PropertyValue>),
    Array(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Short type name used in logs
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Null => "null",
            PropertyValue::Boolean(_) => "boolean",
            PropertyValue::Integer(_) => "integer",
            PropertyValue::Double(_) => "double",
            PropertyValue::String(_) => "string",
            PropertyValue::Bytes(_) => "bytes",
            PropertyValue::Timestamp(_) => "timestamp",
            PropertyValue::GeoPoint(_) => "geo_point",
            PropertyValue::Key(_) => "key",
            PropertyValue::Entity(_) => "entity",
            PropertyValue::Map(_) => "map",
            PropertyValue::Array(_) => "array",
        }
    }

    /// Returns the timestamp, if this is one
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            PropertyValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Boolean(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Integer(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Integer(i64::from(v))
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Double(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::String(v)
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(v: DateTime<Utc>) -> Self {
        PropertyValue::Timestamp(v)
    }
}

impl From<GeoPoint> for PropertyValue {
    fn from(v: GeoPoint) -> Self {
        PropertyValue::GeoPoint(v)
    }
}

impl From<Key> for PropertyValue {
    fn from(v: Key) -> Self {
        PropertyValue::Key(v)
    }
}

impl From<Entity> for PropertyValue {
    fn from(v: Entity) -> Self {
        PropertyValue::Entity(Box::new(v))
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(v: Vec<PropertyValue>) -> Self {
        PropertyValue::Array(v)
    }
}
