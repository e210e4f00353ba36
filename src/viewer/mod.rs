//! Resource viewer
//!
//! Builds the relationship graph of a cluster object (the object, its
//! children, their children, ...) and caches the rendered graph per object.
//!
//! A cache miss answers immediately with a graph holding only a placeholder
//! root node, then resolves the full graph in the background. See
//! [`ComponentCache::get_with_resolution`].

pub mod cache;
pub mod dash;
pub mod error;
pub mod graph;
pub mod key;
pub mod resource_viewer;
pub mod visitor;

pub use cache::{ComponentCache, DEFAULT_CACHE_SIZE, Resolution};
pub use dash::{Dash, ObjectStore, Queryer};
pub use error::{ViewerError, ViewerResult};
pub use graph::{
    GraphCollector, Node, NodeStatus, PLACEHOLDER_ID, ResourceViewerComponent, RootNode,
};
pub use key::{ObjectKey, key_from_object, node_id, to_dynamic_object};
pub use resource_viewer::{ResourceViewer, ResourceViewerBuilder};
pub use visitor::{GraphVisitor, Visitor};
