//! Child discovery through owner references

use crate::models::WorkloadKind;
use crate::viewer::{ObjectStore, Queryer};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::try_join_all;
use kube::core::DynamicObject;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Queryer that finds children by listing the kinds a workload owns
///
/// Objects of kinds outside [`WorkloadKind`] have no children.
pub struct OwnerQueryer {
    store: Arc<dyn ObjectStore>,
}

impl OwnerQueryer {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Queryer for OwnerQueryer {
    async fn children(
        &self,
        ctx: &CancellationToken,
        object: &DynamicObject,
    ) -> Result<Vec<DynamicObject>> {
        let Some(kind) = object
            .types
            .as_ref()
            .and_then(|t| WorkloadKind::parse_optional(&t.kind))
        else {
            return Ok(Vec::new());
        };
        let Some(uid) = object.metadata.uid.as_deref() else {
            return Ok(Vec::new());
        };
        let namespace = object.metadata.namespace.clone().unwrap_or_default();

        let lists = try_join_all(kind.child_kinds().iter().map(|child| {
            self.store
                .list(ctx, &namespace, child.api_version(), child.as_str())
        }))
        .await?;

        Ok(lists
            .into_iter()
            .flatten()
            .filter(|candidate| is_owned_by(candidate, uid))
            .collect())
    }
}

/// Whether `object` has an owner reference to `uid`
pub fn is_owned_by(object: &DynamicObject, uid: &str) -> bool {
    object
        .metadata
        .owner_references
        .as_ref()
        .is_some_and(|refs| refs.iter().any(|r| r.uid == uid))
}
