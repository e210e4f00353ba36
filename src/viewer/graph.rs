//! Graph data structures for resource relationships
//!
//! [`GraphCollector`] is the mutable graph a traversal writes into.
//! [`ResourceViewerComponent`] is the immutable snapshot handed to callers
//! and stored in the component cache.

use super::key::{ObjectKey, node_id};
use kube::core::DynamicObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Node id used for the root while its identity is not yet confirmed
pub const PLACEHOLDER_ID: &str = "emptyID";

/// Component type reported in the metadata
pub const COMPONENT_TYPE: &str = "resourceViewer";

/// Component title
pub const COMPONENT_TITLE: &str = "Resource Viewer";

/// Health of an object, taken from its `Ready` condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Ok,
    Warning,
    Error,
}

impl NodeStatus {
    /// Objects without a `Ready` condition are considered healthy
    pub fn from_object(object: &DynamicObject) -> Self {
        let ready = object
            .data
            .get("status")
            .and_then(|s| s.get("conditions"))
            .and_then(|c| c.as_array())
            .and_then(|arr| {
                arr.iter()
                    .find(|c| c.get("type").and_then(|t| t.as_str()) == Some("Ready"))
            })
            .and_then(|c| c.get("status").and_then(|s| s.as_str()));

        match ready {
            None | Some("True") => NodeStatus::Ok,
            Some("False") => NodeStatus::Error,
            Some(_) => NodeStatus::Warning,
        }
    }
}

/// A node in the resource graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Object name, shown as the node label
    pub name: String,
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub status: NodeStatus,
    /// Display path, only known for the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Ids of child nodes
    #[serde(default)]
    pub edges: Vec<String>,
}

impl Node {
    fn from_object(object: &DynamicObject, key: &ObjectKey) -> Self {
        Self {
            name: key.name.clone(),
            api_version: key.api_version.clone(),
            kind: key.kind.clone(),
            namespace: key.namespace.clone(),
            status: NodeStatus::from_object(object),
            path: None,
            edges: Vec::new(),
        }
    }

    pub fn has_edge(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentMetadata {
    #[serde(rename = "type")]
    pub component_type: String,
    pub title: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceViewerConfig {
    pub nodes: BTreeMap<String, Node>,
    /// Id of the root node
    #[serde(default)]
    pub selected: String,
}

/// Rendered snapshot of a resource graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceViewerComponent {
    pub metadata: ComponentMetadata,
    pub config: ResourceViewerConfig,
}

impl ResourceViewerComponent {
    pub fn new(nodes: BTreeMap<String, Node>, selected: impl Into<String>) -> Self {
        Self {
            metadata: ComponentMetadata {
                component_type: COMPONENT_TYPE.to_string(),
                title: vec![COMPONENT_TITLE.to_string()],
            },
            config: ResourceViewerConfig {
                nodes,
                selected: selected.into(),
            },
        }
    }

    pub fn title(&self) -> &str {
        self.metadata.title.first().map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.config.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.config.nodes.get(id)
    }

    /// True while the root is still keyed by the placeholder
    pub fn is_pending(&self) -> bool {
        self.config.nodes.contains_key(PLACEHOLDER_ID)
    }
}

/// State of the root node of a traversal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RootNode {
    #[default]
    Unset,
    /// Stored under [`PLACEHOLDER_ID`]
    Pending { key: ObjectKey },
    Resolved { key: ObjectKey, id: String },
}

impl RootNode {
    pub fn node_id(&self) -> Option<&str> {
        match self {
            RootNode::Unset => None,
            RootNode::Pending { .. } => Some(PLACEHOLDER_ID),
            RootNode::Resolved { id, .. } => Some(id),
        }
    }

    pub fn key(&self) -> Option<&ObjectKey> {
        match self {
            RootNode::Unset => None,
            RootNode::Pending { key } | RootNode::Resolved { key, .. } => Some(key),
        }
    }
}

/// Result of recording an object in the graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    /// A new node was created (or the pending root was resolved)
    Added(String),
    /// A node with this id already existed
    Existing(String),
}

impl Recorded {
    pub fn id(&self) -> &str {
        match self {
            Recorded::Added(id) | Recorded::Existing(id) => id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Recorded::Added(_))
    }
}

#[derive(Debug, Default)]
struct GraphState {
    root: RootNode,
    nodes: BTreeMap<String, Node>,
}

impl GraphState {
    fn seed_root(&mut self, key: &ObjectKey, object: &DynamicObject, path: Option<String>) -> bool {
        if self.root != RootNode::Unset {
            return false;
        }

        let mut node = Node::from_object(object, key);
        node.path = path;
        self.nodes.insert(PLACEHOLDER_ID.to_string(), node);
        self.root = RootNode::Pending { key: key.clone() };
        true
    }

    fn record(&mut self, key: &ObjectKey, object: &DynamicObject) -> Recorded {
        let id = node_id(object, key);

        if let RootNode::Pending { key: root_key } = &self.root {
            if root_key == key {
                self.resolve_root(key.clone(), id.clone(), object);
                return Recorded::Added(id);
            }
        }

        if self.nodes.contains_key(&id) {
            return Recorded::Existing(id);
        }

        self.nodes.insert(id.clone(), Node::from_object(object, key));
        Recorded::Added(id)
    }

    /// Move the placeholder root to its real id, keeping its path and edges
    fn resolve_root(&mut self, key: ObjectKey, id: String, object: &DynamicObject) {
        let mut node = Node::from_object(object, &key);

        if let Some(placeholder) = self.nodes.remove(PLACEHOLDER_ID) {
            node.path = placeholder.path;
            node.edges = placeholder.edges;
        }
        if let Some(existing) = self.nodes.remove(&id) {
            for edge in existing.edges {
                if !node.has_edge(&edge) {
                    node.edges.push(edge);
                }
            }
        }

        for other in self.nodes.values_mut() {
            for edge in other.edges.iter_mut() {
                if edge == PLACEHOLDER_ID {
                    *edge = id.clone();
                }
            }
        }

        self.nodes.insert(id.clone(), node);
        self.root = RootNode::Resolved { key, id };
    }

    fn link(&mut self, parent: &str, child: &str) -> bool {
        let Some(node) = self.nodes.get_mut(parent) else {
            return false;
        };
        if node.has_edge(child) {
            return false;
        }
        node.edges.push(child.to_string());
        true
    }

    fn component(&self) -> ResourceViewerComponent {
        ResourceViewerComponent::new(
            self.nodes.clone(),
            self.root.node_id().unwrap_or_default(),
        )
    }
}

/// Shared, mutable graph populated by a visitor
#[derive(Debug, Clone, Default)]
pub struct GraphCollector {
    state: Arc<Mutex<GraphState>>,
}

impl GraphCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the placeholder root. Returns false if a root already exists.
    pub async fn seed_root(
        &self,
        key: &ObjectKey,
        object: &DynamicObject,
        path: Option<String>,
    ) -> bool {
        self.state.lock().await.seed_root(key, object, path)
    }

    pub async fn root(&self) -> RootNode {
        self.state.lock().await.root.clone()
    }

    /// Record an object as a node
    ///
    /// Recording the object a pending root stands for resolves the root in
    /// place instead of adding a second node.
    pub async fn record(&self, key: &ObjectKey, object: &DynamicObject) -> Recorded {
        self.state.lock().await.record(key, object)
    }

    /// Add a parent -> child edge. Returns false for duplicates or unknown parents.
    pub async fn link(&self, parent: &str, child: &str) -> bool {
        self.state.lock().await.link(parent, child)
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.nodes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Snapshot of the current graph
    pub async fn component(&self) -> ResourceViewerComponent {
        self.state.lock().await.component()
    }
}
