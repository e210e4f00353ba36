//! resview library
//!
//! Cached resource-relationship graphs for Kubernetes objects. The
//! [`viewer`] module holds the graph builder and component cache; [`kube`]
//! provides the cluster-backed collaborators used by the binary.

pub mod cli;
pub mod config;
pub mod kube;
pub mod models;
pub mod viewer;

// Re-export commonly used types for convenience
pub use models::WorkloadKind;
pub use viewer::{
    ComponentCache, Dash, GraphVisitor, ObjectKey, ObjectStore, Queryer, Resolution,
    ResourceViewer, ResourceViewerComponent, ViewerError, ViewerResult, Visitor,
};
