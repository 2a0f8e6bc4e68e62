//! Conversions between domain keys/entities and the client representation
//!
//! A domain [`Key`] may chain to a parent; the client key flattens that chain
//! into one path. Nested keys and entities that carry no project inherit the
//! containing entity's project on the way out.

use super::client::{ClientEntity, ClientKey, ClientValue};
use crate::domain::key::Key;
use crate::domain::value::PropertyValue;
use crate::domain::{Entity, FerryError, Result, SourceError};
use std::collections::BTreeMap;

impl Key {
    /// Builds a domain key from a client key
    ///
    /// The flattened path becomes this key's own path; no parent is set.
    pub fn from_client(client: &ClientKey) -> Key {
        Key {
            path_elements: client.flat_path.clone(),
            parent: None,
            project: client.project.clone(),
            namespace: client.namespace.clone(),
        }
    }

    /// Converts to the client representation
    ///
    /// # Errors
    ///
    /// Returns [`FerryError::Validation`] when the path is empty, a kind slot
    /// is not a name, the parent is partial, or the key's project or namespace
    /// conflicts with its parent's.
    pub fn to_client(&self) -> Result<ClientKey> {
        if self.path_elements.is_empty() {
            return Err(FerryError::Validation(
                "key path must contain at least one kind".to_string(),
            ));
        }

        for kind in self.path_elements.iter().step_by(2) {
            if kind.as_name().is_none() {
                return Err(FerryError::Validation(format!(
                    "kind element is not a name in key path {}",
                    self.render_path()
                )));
            }
        }

        let Some(parent) = &self.parent else {
            return Ok(ClientKey {
                flat_path: self.path_elements.clone(),
                project: self.project.clone(),
                namespace: self.namespace.clone(),
            });
        };

        let parent = parent.to_client()?;
        if parent.is_partial() {
            return Err(FerryError::Validation(format!(
                "parent key must be complete, got {}",
                crate::domain::key::render_path(&parent.flat_path)
            )));
        }

        let project = inherit_scope("project", &self.project, parent.project)?;
        let namespace = inherit_scope("namespace", &self.namespace, parent.namespace)?;

        let mut flat_path = parent.flat_path;
        flat_path.extend(self.path_elements.iter().cloned());

        Ok(ClientKey {
            flat_path,
            project,
            namespace,
        })
    }
}

fn inherit_scope(
    field: &str,
    own: &Option<String>,
    parent: Option<String>,
) -> Result<Option<String>> {
    match (own, parent) {
        (Some(own), Some(parent)) if *own != parent => Err(FerryError::Validation(format!(
            "key {field} '{own}' conflicts with parent {field} '{parent}'"
        ))),
        (Some(own), _) => Ok(Some(own.clone())),
        (None, parent) => Ok(parent),
    }
}

impl Entity {
    /// Builds a domain entity from a client entity
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingKey`] when the client entity has no key.
    pub fn from_client(client: &ClientEntity) -> Result<Entity> {
        let key = client.key.as_ref().ok_or(SourceError::MissingKey)?;
        Ok(Entity {
            key: Key::from_client(key),
            exclude_from_indexes: client.exclude_from_indexes.iter().cloned().collect(),
            properties: properties_from_client(&client.properties)?,
        })
    }

    /// Converts to the client representation
    ///
    /// Nested keys and keyed entities without a project are emitted with this
    /// entity's key project; `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if this key or any nested key fails conversion.
    pub fn to_client(&self) -> Result<ClientEntity> {
        let key = self.key.to_client()?;
        let project = key.project.clone();
        Ok(ClientEntity {
            key: Some(key),
            exclude_from_indexes: self.exclude_from_indexes.iter().cloned().collect(),
            properties: properties_to_client(&self.properties, project.as_deref())?,
        })
    }
}

fn properties_from_client(
    properties: &BTreeMap<String, ClientValue>,
) -> Result<BTreeMap<String, PropertyValue>> {
    properties
        .iter()
        .map(|(name, value)| Ok((name.clone(), value_from_client(value)?)))
        .collect()
}

fn value_from_client(value: &ClientValue) -> Result<PropertyValue> {
    Ok(match value {
        ClientValue::NullValue => PropertyValue::Null,
        ClientValue::BooleanValue(b) => PropertyValue::Boolean(*b),
        ClientValue::IntegerValue(i) => PropertyValue::Integer(*i),
        ClientValue::DoubleValue(d) => PropertyValue::Double(*d),
        ClientValue::StringValue(s) => PropertyValue::String(s.clone()),
        ClientValue::BlobValue(bytes) => PropertyValue::Bytes(bytes.clone()),
        ClientValue::TimestampValue(ts) => PropertyValue::Timestamp(*ts),
        ClientValue::GeoPointValue(point) => PropertyValue::GeoPoint(*point),
        ClientValue::KeyValue(key) => PropertyValue::Key(Key::from_client(key)),
        ClientValue::EntityValue(entity) if entity.key.is_some() => {
            PropertyValue::Entity(Box::new(Entity::from_client(entity)?))
        }
        ClientValue::EntityValue(entity) => {
            PropertyValue::Map(properties_from_client(&entity.properties)?)
        }
        ClientValue::ArrayValue(values) => PropertyValue::Array(
            values
                .iter()
                .map(value_from_client)
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

fn properties_to_client(
    properties: &BTreeMap<String, PropertyValue>,
    project: Option<&str>,
) -> Result<BTreeMap<String, ClientValue>> {
    properties
        .iter()
        .map(|(name, value)| Ok((name.clone(), value_to_client(value, project)?)))
        .collect()
}

fn value_to_client(value: &PropertyValue, project: Option<&str>) -> Result<ClientValue> {
    Ok(match value {
        PropertyValue::Null => ClientValue::NullValue,
        PropertyValue::Boolean(b) => ClientValue::BooleanValue(*b),
        PropertyValue::Integer(i) => ClientValue::IntegerValue(*i),
        PropertyValue::Double(d) => ClientValue::DoubleValue(*d),
        PropertyValue::String(s) => ClientValue::StringValue(s.clone()),
        PropertyValue::Bytes(bytes) => ClientValue::BlobValue(bytes.clone()),
        PropertyValue::Timestamp(ts) => ClientValue::TimestampValue(*ts),
        PropertyValue::GeoPoint(point) => ClientValue::GeoPointValue(*point),
        PropertyValue::Key(key) => ClientValue::KeyValue(with_default_project(key, project).to_client()?),
        PropertyValue::Entity(entity) => {
            let mut nested = entity.as_ref().clone();
            nested.key = with_default_project(&entity.key, project);
            ClientValue::EntityValue(nested.to_client()?)
        }
        PropertyValue::Map(properties) => ClientValue::EntityValue(ClientEntity {
            key: None,
            exclude_from_indexes: Vec::new(),
            properties: properties_to_client(properties, project)?,
        }),
        PropertyValue::Array(values) => ClientValue::ArrayValue(
            values
                .iter()
                .map(|v| value_to_client(v, project))
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

fn with_default_project(key: &Key, project: Option<&str>) -> Key {
    let mut key = key.clone();
    if key.effective_project().is_none() {
        key.project = project.map(String::from);
    }
    key
}
