//! Object identity keys
//!
//! An [`ObjectKey`] identifies a cluster object by its type and identity
//! metadata. It is used as the component cache key and, when the object has
//! no UID, as its node id in the rendered graph.

use super::error::{ViewerError, ViewerResult};
use kube::Resource;
use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a cluster object
///
/// Derived only from identity metadata, so two revisions of the same object
/// (different `resourceVersion`, different status) share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectKey {
    pub api_version: String,
    pub kind: String,
    /// Empty for cluster-scoped objects
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_version: api_version.into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Derive a key from a typed Kubernetes resource
    pub fn from_resource<K>(resource: &K) -> ViewerResult<Self>
    where
        K: Resource<DynamicType = ()>,
    {
        let meta = resource.meta();
        let name = meta
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ViewerError::InvalidObject(format!("{} has no name", K::kind(&()))))?;

        Ok(Self::new(
            K::api_version(&()),
            K::kind(&()),
            meta.namespace.clone().unwrap_or_default(),
            name,
        ))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.api_version, self.kind, self.namespace, self.name
        )
    }
}

/// Derive the key of a dynamic object
///
/// Fails when the object carries no kind or no name.
pub fn key_from_object(object: &DynamicObject) -> ViewerResult<ObjectKey> {
    let types = object
        .types
        .as_ref()
        .ok_or_else(|| ViewerError::InvalidObject("object has no type metadata".to_string()))?;

    if types.kind.is_empty() {
        return Err(ViewerError::InvalidObject("object has no kind".to_string()));
    }

    let name = object
        .metadata
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ViewerError::InvalidObject(format!("{} has no name", types.kind)))?;

    Ok(ObjectKey::new(
        types.api_version.clone(),
        types.kind.clone(),
        object.metadata.namespace.clone().unwrap_or_default(),
        name,
    ))
}

/// Graph node id for an object: its UID, or the key when no UID is set
pub fn node_id(object: &DynamicObject, key: &ObjectKey) -> String {
    object
        .metadata
        .uid
        .as_deref()
        .filter(|uid| !uid.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| key.to_string())
}

/// Convert a typed resource into a [`DynamicObject`]
pub fn to_dynamic_object<K: Serialize>(resource: &K) -> ViewerResult<DynamicObject> {
    let value = serde_json::to_value(resource)
        .map_err(|e| ViewerError::InvalidObject(format!("failed to serialize object: {}", e)))?;
    serde_json::from_value(value)
        .map_err(|e| ViewerError::InvalidObject(format!("failed to convert object: {}", e)))
}
