//! Model layer
//!
//! Kubernetes kinds the shipped collaborators know about.

pub mod kind;

pub use kind::WorkloadKind;
