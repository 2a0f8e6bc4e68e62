//! Entity-to-record conversion
//!
//! This module flattens an entity into a plain field mapping suitable for
//! warehouse ingestion:
//! - `_key` / `_kind` hold the decoded identifier and kind
//! - timestamps become their canonical string form
//! - geo points become `{lat, lng}` string pairs
//! - everything else is copied unchanged

use super::decode::decode_key;
use crate::domain::key::IdOrName;
use crate::domain::value::{GeoPoint, PropertyValue};
use crate::domain::{DecodeError, Entity};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Record field holding the decoded identifier
pub const KEY_FIELD: &str = "_key";

/// Record field holding the decoded kind
pub const KIND_FIELD: &str = "_kind";

/// Flat record produced from one entity
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, PropertyValue>,
}

impl Record {
    /// Decoded identifier (`_key`)
    pub fn key(&self) -> Option<IdOrName> {
        match self.fields.get(KEY_FIELD)? {
            PropertyValue::Integer(id) => Some(IdOrName::Id(*id)),
            PropertyValue::String(name) => Some(IdOrName::Name(name.clone())),
            _ => None,
        }
    }

    /// Decoded kind (`_kind`), unmodified
    pub fn kind(&self) -> Option<&str> {
        match self.fields.get(KIND_FIELD)? {
            PropertyValue::String(kind) => Some(kind),
            _ => None,
        }
    }

    /// Looks up a field
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.fields.get(name)
    }

    /// All fields in name order
    pub fn fields(&self) -> &BTreeMap<String, PropertyValue> {
        &self.fields
    }

    /// Number of fields, `_key` and `_kind` included
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Renders the record as a JSON object for the warehouse loader
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, value)| (name.clone(), render_value(value)))
            .collect();
        Value::Object(map)
    }

    /// Renders the record as one line of newline-delimited JSON
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_json())
    }
}

/// Convert an entity into a flat record
///
/// The input is not modified. A property whose name collides with `_key` or
/// `_kind` is overwritten by the decoded value.
///
/// # Errors
///
/// Returns a [`DecodeError`] if the entity key cannot be decoded.
///
/// # Examples
///
/// ```
/// use ferry::core::transform::record::entity_to_record;
/// use ferry::domain::{EntityBuilder, Key, PropertyValue};
///
/// let entity = EntityBuilder::new(Key::new(["Order".into(), 42.into()]))
///     .property("total", 9.5)
///     .build()
///     .unwrap();
///
/// let record = entity_to_record(&entity).unwrap();
/// assert_eq!(record.kind(), Some("Order"));
/// assert_eq!(record.get("total"), Some(&PropertyValue::Double(9.5)));
/// ```
pub fn entity_to_record(entity: &Entity) -> Result<Record, DecodeError> {
    let ent_key = decode_key(&entity.key)?;

    let mut fields: BTreeMap<String, PropertyValue> = entity
        .properties
        .iter()
        .map(|(name, value)| (name.clone(), convert_property(value)))
        .collect();

    for reserved in [KEY_FIELD, KIND_FIELD] {
        if fields.contains_key(reserved) {
            tracing::warn!(
                kind = %ent_key.kind,
                property = reserved,
                "Entity property shadows a reserved record field and is dropped"
            );
        }
    }

    let key_value = match ent_key.id_or_name {
        IdOrName::Id(id) => PropertyValue::Integer(id),
        IdOrName::Name(name) => PropertyValue::String(name),
    };
    fields.insert(KEY_FIELD.to_string(), key_value);
    fields.insert(KIND_FIELD.to_string(), PropertyValue::String(ent_key.kind));

    Ok(Record { fields })
}

/// Canonical string form of a timestamp: RFC 3339 with an explicit offset
///
/// `2023-01-01T00:00:00Z` renders as `2023-01-01T00:00:00+00:00`.
pub fn canonical_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// String form of a coordinate, always carrying a fractional part (`37.0`, `-122.1`)
pub fn format_coordinate(value: f64) -> String {
    format!("{value:?}")
}

fn convert_property(value: &PropertyValue) -> PropertyValue {
    match value {
        PropertyValue::Timestamp(ts) => PropertyValue::String(canonical_timestamp(ts)),
        PropertyValue::GeoPoint(point) => geo_point_record(point),
        other => other.clone(),
    }
}

fn geo_point_record(point: &GeoPoint) -> PropertyValue {
    let mut map = BTreeMap::new();
    map.insert(
        "lat".to_string(),
        PropertyValue::String(format_coordinate(point.latitude)),
    );
    map.insert(
        "lng".to_string(),
        PropertyValue::String(format_coordinate(point.longitude)),
    );
    PropertyValue::Map(map)
}

// Non-finite doubles have no JSON form.
fn render_float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// JSON rendering of a value for the loader
fn render_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Null => Value::Null,
        PropertyValue::Boolean(b) => Value::Bool(*b),
        PropertyValue::Integer(i) => Value::Number((*i).into()),
        PropertyValue::Double(d) => render_float(*d),
        PropertyValue::String(s) => Value::String(s.clone()),
        PropertyValue::Bytes(bytes) => Value::String(STANDARD.encode(bytes)),
        PropertyValue::Timestamp(ts) => Value::String(canonical_timestamp(ts)),
        PropertyValue::GeoPoint(point) => {
            let mut map = Map::new();
            map.insert("lat".to_string(), format_coordinate(point.latitude).into());
            map.insert("lng".to_string(), format_coordinate(point.longitude).into());
            Value::Object(map)
        }
        PropertyValue::Key(key) => {
            let mut map = Map::new();
            map.insert(
                "project".to_string(),
                key.effective_project().map_or(Value::Null, |p| p.into()),
            );
            map.insert(
                "namespace".to_string(),
                key.effective_namespace().map_or(Value::Null, |n| n.into()),
            );
            map.insert(
                "path".to_string(),
                serde_json::to_value(key.flat_path()).unwrap_or(Value::Null),
            );
            Value::Object(map)
        }
        PropertyValue::Entity(entity) => Value::Object(
            entity
                .properties
                .iter()
                .map(|(name, v)| (name.clone(), render_value(v)))
                .collect(),
        ),
        PropertyValue::Map(map) => Value::Object(
            map.iter()
                .map(|(name, v)| (name.clone(), render_value(v)))
                .collect(),
        ),
        PropertyValue::Array(values) => Value::Array(values.iter().map(render_value).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityBuilder, Key};
    use chrono::TimeZone;
    use serde_json::json;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
    }

    fn order() -> Entity {
        EntityBuilder::new(Key::new(["Order".into(), 42.into()]))
            .property("total", 9.5)
            .property("updated_at", ts())
            .build()
            .unwrap()
    }

    #[test]
    fn test_order_record_end_to_end() {
        let record = entity_to_record(&order()).unwrap();

        assert_eq!(
            record.to_json(),
            json!({
                "_key": 42,
                "_kind": "Order",
                "total": 9.5,
                "updated_at": "2023-01-01T00:00:00+00:00"
            })
        );
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_key_and_kind_match_decoder() {
        let entity = EntityBuilder::new(Key::new([
            "Customer".into(),
            "alice".into(),
            "Cart".into(),
            "c-1".into(),
        ]))
        .build()
        .unwrap();

        let record = entity_to_record(&entity).unwrap();
        let decoded = decode_key(&entity.key).unwrap();

        assert_eq!(record.key(), Some(decoded.id_or_name));
        assert_eq!(record.kind(), Some(decoded.kind.as_str()));
    }

    #[test]
    fn test_kind_is_not_lowercased() {
        let entity = EntityBuilder::new(Key::new(["UserProfile".into(), 1.into()]))
            .build()
            .unwrap();
        let record = entity_to_record(&entity).unwrap();
        assert_eq!(record.kind(), Some("UserProfile"));
    }

    #[test]
    fn test_timestamp_conversion_is_stable() {
        let record = entity_to_record(&order()).unwrap();
        let first = record.get("updated_at").cloned();
        let again = entity_to_record(&order()).unwrap();

        assert_eq!(
            first,
            Some(PropertyValue::String("2023-01-01T00:00:00+00:00".to_string()))
        );
        assert_eq!(record, again);
    }

    #[test]
    fn test_geo_point_conversion() {
        let entity = EntityBuilder::new(Key::new(["Store".into(), "sf".into()]))
            .property("location", GeoPoint::new(37.4, -122.1))
            .build()
            .unwrap();

        let record = entity_to_record(&entity).unwrap();
        assert_eq!(
            record.to_json()["location"],
            json!({"lat": "37.4", "lng": "-122.1"})
        );
    }

    #[test]
    fn test_geo_points_inside_arrays_render_as_strings() {
        let stops = vec![
            PropertyValue::from(GeoPoint::new(37.4, -122.1)),
            PropertyValue::from(GeoPoint::new(48.0, 2.35)),
        ];
        let entity = EntityBuilder::new(Key::new(["Route".into(), "r1".into()]))
            .property("stops", stops)
            .build()
            .unwrap();

        let record = entity_to_record(&entity).unwrap();
        assert_eq!(
            record.to_json()["stops"],
            json!([
                {"lat": "37.4", "lng": "-122.1"},
                {"lat": "48.0", "lng": "2.35"}
            ])
        );
    }

    #[test]
    fn test_format_coordinate_keeps_fraction() {
        assert_eq!(format_coordinate(37.0), "37.0");
        assert_eq!(format_coordinate(-122.1), "-122.1");
    }

    #[test]
    fn test_nested_values_pass_through() {
        let address = EntityBuilder::new(Key::new(["Address".into(), 1.into()]))
            .property("city", "Paris")
            .build()
            .unwrap();
        let tags = vec![PropertyValue::from("a"), PropertyValue::from("b")];
        let entity = EntityBuilder::new(Key::new(["User".into(), "u".into()]))
            .property("address", address.clone())
            .property("tags", tags.clone())
            .property("visits", 3)
            .build()
            .unwrap();

        let record = entity_to_record(&entity).unwrap();
        assert_eq!(record.get("address"), Some(&PropertyValue::from(address)));
        assert_eq!(record.get("tags"), Some(&PropertyValue::Array(tags)));
        assert_eq!(record.get("visits"), Some(&PropertyValue::Integer(3)));
    }

    #[test]
    fn test_input_entity_not_mutated() {
        let entity = order();
        let before = entity.clone();
        let _ = entity_to_record(&entity).unwrap();
        assert_eq!(entity, before);
    }

    #[test]
    fn test_reserved_field_wins_over_property() {
        let entity = EntityBuilder::new(Key::new(["Order".into(), 42.into()]))
            .property("_kind", "spoofed")
            .build()
            .unwrap();

        let record = entity_to_record(&entity).unwrap();
        assert_eq!(record.kind(), Some("Order"));
    }

    #[test]
    fn test_undecodable_key_fails() {
        let entity = Entity::new(Key::new(["Order".into()]), Vec::<String>::new());
        assert!(matches!(
            entity_to_record(&entity),
            Err(DecodeError::PathTooShort { .. })
        ));
    }

    #[test]
    fn test_render_nested_values() {
        let key = Key::new(["User".into(), "bob".into()]).with_project("shop");
        let nested_ts = PropertyValue::Array(vec![ts().into()]);
        let entity = EntityBuilder::new(Key::new(["Msg".into(), 1.into()]))
            .property("author", key)
            .property("blob", PropertyValue::Bytes(b"hi".to_vec()))
            .property("seen", nested_ts)
            .property("ratio", f64::NAN)
            .build()
            .unwrap();

        let json = entity_to_record(&entity).unwrap().to_json();
        assert_eq!(
            json["author"],
            json!({"project": "shop", "namespace": null, "path": ["User", "bob"]})
        );
        assert_eq!(json["blob"], "aGk=");
        assert_eq!(json["seen"], json!(["2023-01-01T00:00:00+00:00"]));
        assert_eq!(json["ratio"], Value::Null);
    }

    #[test]
    fn test_to_json_line_is_single_line() {
        let line = entity_to_record(&order()).unwrap().to_json_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.starts_with('{'));
    }
}
