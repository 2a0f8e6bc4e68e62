//! Entity key model
//!
//! A [`Key`] is the hierarchical identifier of an entity in the document store:
//! an alternating sequence of kind and identifier, optionally chained to a
//! parent key and scoped to a project and namespace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifier slot of a key path (also used for kind slots, which are always names)
///
/// Serializes untagged, so `42` and `"alice"` are both valid on the wire.
///
/// # Examples
///
/// ```
/// use ferry::domain::key::IdOrName;
///
/// assert_eq!(IdOrName::from(42).to_string(), "42");
/// assert_eq!(IdOrName::from("alice").to_string(), "alice");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdOrName {
    /// Numeric identifier
    Id(i64),
    /// String identifier or kind name
    Name(String),
}

impl IdOrName {
    /// Returns the name, if this is a name
    pub fn as_name(&self) -> Option<&str> {
        match self {
            IdOrName::Name(name) => Some(name),
            IdOrName::Id(_) => None,
        }
    }

    /// Returns the numeric id, if this is an id
    pub fn as_id(&self) -> Option<i64> {
        match self {
            IdOrName::Id(id) => Some(*id),
            IdOrName::Name(_) => None,
        }
    }
}

impl fmt::Display for IdOrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdOrName::Id(id) => write!(f, "{id}"),
            IdOrName::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for IdOrName {
    fn from(id: i64) -> Self {
        IdOrName::Id(id)
    }
}

impl From<i32> for IdOrName {
    fn from(id: i32) -> Self {
        IdOrName::Id(i64::from(id))
    }
}

impl From<&str> for IdOrName {
    fn from(name: &str) -> Self {
        IdOrName::Name(name.to_string())
    }
}

impl From<String> for IdOrName {
    fn from(name: String) -> Self {
        IdOrName::Name(name)
    }
}

/// Renders a flattened path the way it appears in error messages: `["Order", 42]`
pub fn render_path(path: &[IdOrName]) -> String {
    let parts: Vec<String> = path
        .iter()
        .map(|element| match element {
            IdOrName::Id(id) => id.to_string(),
            IdOrName::Name(name) => format!("{name:?}"),
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

/// Document-store key
///
/// The parent is shared, not owned: several child keys may point at the same
/// parent. If a parent is set, `project` and `namespace` on the child should
/// be unset or equal to the parent's; this is checked when the key is handed
/// to the client library.
///
/// Equality compares `path_elements`, `project` and the parent chain
/// (recursively). The namespace is not part of equality. Keys are deliberately
/// not `Hash`.
///
/// # Examples
///
/// ```
/// use ferry::domain::key::Key;
///
/// let key = Key::new(["Order".into(), 42.into()]).with_project("shop");
/// assert!(key.is_complete());
/// assert_eq!(key.kind(), Some("Order"));
/// ```
#[derive(Debug, Clone)]
pub struct Key {
    /// Alternating kind / identifier path
    pub path_elements: Vec<IdOrName>,

    /// Parent key, if any
    pub parent: Option<Arc<Key>>,

    /// Project id
    pub project: Option<String>,

    /// Namespace id
    pub namespace: Option<String>,
}

impl Key {
    /// Creates a key from its path elements with no parent and no scope
    pub fn new(path_elements: impl IntoIterator<Item = IdOrName>) -> Self {
        Self {
            path_elements: path_elements.into_iter().collect(),
            parent: None,
            project: None,
            namespace: None,
        }
    }

    /// Sets the parent key
    pub fn with_parent(mut self, parent: impl Into<Arc<Key>>) -> Self {
        self.parent = Some(parent.into());
        self
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

    /// A key is complete when its path is non-empty and ends with an identifier
    pub fn is_complete(&self) -> bool {
        !self.path_elements.is_empty() && self.path_elements.len() % 2 == 0
    }

    /// Kind of the last pair in this key's own path
    pub fn kind(&self) -> Option<&str> {
        let len = self.path_elements.len();
        let index = if len % 2 == 0 { len.checked_sub(2)? } else { len - 1 };
        self.path_elements.get(index)?.as_name()
    }

    /// Project, falling back to the parent chain
    pub fn effective_project(&self) -> Option<&str> {
        match (&self.project, &self.parent) {
            (Some(project), _) => Some(project),
            (None, Some(parent)) => parent.effective_project(),
            (None, None) => None,
        }
    }

    /// Namespace, falling back to the parent chain
    pub fn effective_namespace(&self) -> Option<&str> {
        match (&self.namespace, &self.parent) {
            (Some(namespace), _) => Some(namespace),
            (None, Some(parent)) => parent.effective_namespace(),
            (None, None) => None,
        }
    }

    /// Full flattened path: the parent chain's path followed by this key's own
    pub fn flat_path(&self) -> Vec<IdOrName> {
        let mut path = match &self.parent {
            Some(parent) => parent.flat_path(),
            None => Vec::new(),
        };
        path.extend(self.path_elements.iter().cloned());
        path
    }

    /// Renders this key's own path for messages
    pub fn render_path(&self) -> String {
        render_path(&self.path_elements)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        if self.path_elements != other.path_elements || self.project != other.project {
            return false;
        }
        match (&self.parent, &other.parent) {
            (Some(a), Some(b)) => a == b,
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({}", self.render_path())?;
        if let Some(parent) = &self.parent {
            write!(f, ", parent={parent}")?;
        }
        if let Some(project) = &self.project {
            write!(f, ", project={project}")?;
        }
        if let Some(namespace) = &self.namespace {
            write!(f, ", namespace={namespace}")?;
        }
        write!(f, ")")
    }
}

/// Decoded key: only the entity's own kind and identifier
///
/// This is a projection of [`Key`] produced by the key decoder and used as the
/// `_kind` / `_key` pair of exported records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntKey {
    /// Entity kind
    pub kind: String,

    /// Entity identifier
    pub id_or_name: IdOrName,
}

impl EntKey {
    /// Creates a new decoded key
    pub fn new(kind: impl Into<String>, id_or_name: impl Into<IdOrName>) -> Self {
        Self {
            kind: kind.into(),
            id_or_name: id_or_name.into(),
        }
    }
}

impl fmt::Display for EntKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id_or_name)
    }
}
