//! Document-store client representation
//!
//! These types mirror what the database client library hands out: keys carry
//! a single flattened path and embedded entities may have no key. They are the
//! boundary format; the rest of Ferry works on [`crate::domain`] types.

use crate::domain::key::IdOrName;
use crate::domain::value::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Client-side key
///
/// A key whose path has odd length ends in a kind with no identifier and is
/// partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientKey {
    /// Flattened ancestor path ending with the entity's own kind and id
    #[serde(rename = "path")]
    pub flat_path: Vec<IdOrName>,

    /// Project id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Namespace id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl ClientKey {
    /// Creates a client key from a flattened path
    pub fn new(flat_path: Vec<IdOrName>) -> Self {
        Self {
            flat_path,
            project: None,
            namespace: None,
        }
    }

    /// Sets the project
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the namespace
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Whether the key lacks a trailing identifier
    pub fn is_partial(&self) -> bool {
        self.flat_path.len() % 2 != 0
    }
}

/// Client-side entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientEntity {
    /// Key; embedded entities may have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ClientKey>,

    /// Property names excluded from indexing
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude_from_indexes: Vec<String>,

    /// Property values by name
    #[serde(default)]
    pub properties: BTreeMap<String, ClientValue>,
}

impl ClientEntity {
    /// Creates an empty client entity
    pub fn new(key: Option<ClientKey>) -> Self {
        Self {
            key,
            exclude_from_indexes: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Sets a property
    pub fn with_property(mut self, name: impl Into<String>, value: ClientValue) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

/// Client-side property value
///
/// Serialized externally tagged, e.g. `{"timestampValue": "2024-01-01T00:00:00Z"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientValue {
    NullValue,
    BooleanValue(bool),
    IntegerValue(i64),
    DoubleValue(f64),
    StringValue(String),
    BlobValue(#[serde(with = "base64_bytes")] Vec<u8>),
    TimestampValue(DateTime<Utc>),
    GeoPointValue(GeoPoint),
    KeyValue(ClientKey),
    EntityValue(ClientEntity),
    ArrayValue(Vec<ClientValue>),
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_key_partial() {
        let complete = ClientKey::new(vec!["Order".into(), 1.into()]);
        let partial = ClientKey::new(vec!["Order".into()]);
        assert!(!complete.is_partial());
        assert!(partial.is_partial());
    }

    #[test]
    fn test_client_entity_from_json() {
        let raw = json!({
            "key": {"path": ["Customer", "alice", "Order", 42], "project": "shop"},
            "excludeFromIndexes": ["notes"],
            "properties": {
                "total": {"doubleValue": 9.5},
                "updated_at": {"timestampValue": "2023-01-01T00:00:00Z"},
                "where": {"geoPointValue": {"latitude": 37.4, "longitude": -122.1}},
                "blob": {"blobValue": "aGk="},
                "gone": "nullValue",
                "lines": {"arrayValue": [{"integerValue": 1}, {"stringValue": "x"}]}
            }
        });

        let entity: ClientEntity = serde_json::from_value(raw).unwrap();
        let key = entity.key.as_ref().unwrap();
        assert_eq!(key.flat_path.len(), 4);
        assert_eq!(key.project.as_deref(), Some("shop"));
        assert_eq!(entity.exclude_from_indexes, vec!["notes".to_string()]);
        assert_eq!(entity.properties["blob"], ClientValue::BlobValue(b"hi".to_vec()));
        assert_eq!(entity.properties["gone"], ClientValue::NullValue);
        assert!(matches!(
            entity.properties["lines"],
            ClientValue::ArrayValue(ref values) if values.len() == 2
        ));
    }

    #[test]
    fn test_client_entity_defaults() {
        let entity: ClientEntity = serde_json::from_value(json!({})).unwrap();
        assert!(entity.key.is_none());
        assert!(entity.properties.is_empty());
    }
}
