//! Entity domain model
//!
//! This module defines the Entity type: a key plus named, typed properties.

use super::key::Key;
use super::value::PropertyValue;
use std::collections::{BTreeMap, BTreeSet};

/// Document-store entity
///
/// Equality is structural over key, exclusion set and properties.
///
/// # Examples
///
/// ```
/// use ferry::domain::entity::EntityBuilder;
/// use ferry::domain::key::Key;
///
/// let entity = EntityBuilder::new(Key::new(["Order".into(), 42.into()]))
///     .property("total", 9.5)
///     .exclude_from_index("notes")
///     .property("notes", "leave at door")
///     .build()
///     .unwrap();
///
/// assert_eq!(entity.properties.len(), 2);
/// assert!(entity.exclude_from_indexes.contains("notes"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Complete key of this entity
    pub key: Key,

    /// Property names excluded from indexing
    pub exclude_from_indexes: BTreeSet<String>,

    /// Property values by name
    pub properties: BTreeMap<String, PropertyValue>,
}

impl Entity {
    /// Creates an entity with no properties
    pub fn new<I, S>(key: Key, exclude_from_indexes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key,
            exclude_from_indexes: exclude_from_indexes.into_iter().map(Into::into).collect(),
            properties: BTreeMap::new(),
        }
    }

    /// Creates a new builder for constructing an Entity
    pub fn builder(key: Key) -> EntityBuilder {
        EntityBuilder::new(key)
    }

    /// Merges the given properties into this entity, replacing existing names
    pub fn set_properties(&mut self, properties: impl IntoIterator<Item = (String, PropertyValue)>) {
        self.properties.extend(properties);
    }

    /// Looks up a property by name
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// Builder for constructing Entity instances
#[derive(Debug)]
pub struct EntityBuilder {
    key: Key,
    exclude_from_indexes: BTreeSet<String>,
    properties: BTreeMap<String, PropertyValue>,
}

impl EntityBuilder {
    /// Creates a new builder for the given key
    pub fn new(key: Key) -> Self {
        Self {
            key,
            exclude_from_indexes: BTreeSet::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Sets a property
    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Excludes a property from indexing
    pub fn exclude_from_index(mut self, name: impl Into<String>) -> Self {
        self.exclude_from_indexes.insert(name.into());
        self
    }

    /// Builds the Entity
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not complete
    pub fn build(self) -> Result<Entity, String> {
        if !self.key.is_complete() {
            return Err(format!(
                "entity key must be complete, got {}",
                self.key.render_path()
            ));
        }
        Ok(Entity {
            key: self.key,
            exclude_from_indexes: self.exclude_from_indexes,
            properties: self.properties,
        })
    }
}
