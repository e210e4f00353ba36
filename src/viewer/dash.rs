//! Collaborator traits consumed by the resource viewer

use super::key::ObjectKey;
use anyhow::Result;
use async_trait::async_trait;
use kube::core::DynamicObject;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Read access to cluster objects
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a single object, `None` if it does not exist
    async fn get(&self, ctx: &CancellationToken, key: &ObjectKey) -> Result<Option<DynamicObject>>;

    /// List all objects of a kind, in one namespace or (empty namespace) cluster-wide
    async fn list(
        &self,
        ctx: &CancellationToken,
        namespace: &str,
        api_version: &str,
        kind: &str,
    ) -> Result<Vec<DynamicObject>>;
}

/// Finds the direct children of an object
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Queryer: Send + Sync {
    async fn children(
        &self,
        ctx: &CancellationToken,
        object: &DynamicObject,
    ) -> Result<Vec<DynamicObject>>;
}

/// Dashboard wiring handed to the cache and every resource viewer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Dash: Send + Sync {
    fn object_store(&self) -> Arc<dyn ObjectStore>;

    /// Display path of an object
    async fn object_path(
        &self,
        ctx: &CancellationToken,
        namespace: &str,
        api_version: &str,
        kind: &str,
        name: &str,
    ) -> Result<String>;
}
