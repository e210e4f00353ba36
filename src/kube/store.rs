//! Object store backed by the Kubernetes API
//!
//! Works on [`DynamicObject`] so any kind can be fetched without typed
//! bindings. Plurals are derived from the kind, no discovery round trip.

use super::split_api_version;
use crate::viewer::{ObjectKey, ObjectStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::api::{Api, ListParams};
use kube::core::{ApiResource, DynamicObject, GroupVersionKind, TypeMeta};
use kube::Client;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct KubeObjectStore {
    client: Client,
}

impl KubeObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Namespaced API, or cluster-wide when `namespace` is empty
    fn api(&self, namespace: &str, api_version: &str, kind: &str) -> Api<DynamicObject> {
        let (group, version) = split_api_version(api_version);
        let gvk = GroupVersionKind::gvk(group, version, kind);
        let api_resource = ApiResource::from_gvk(&gvk);

        if namespace.is_empty() {
            Api::all_with(self.client.clone(), &api_resource)
        } else {
            Api::namespaced_with(self.client.clone(), namespace, &api_resource)
        }
    }
}

#[async_trait]
impl ObjectStore for KubeObjectStore {
    async fn get(&self, ctx: &CancellationToken, key: &ObjectKey) -> Result<Option<DynamicObject>> {
        let api = self.api(&key.namespace, &key.api_version, &key.kind);

        tokio::select! {
            _ = ctx.cancelled() => anyhow::bail!("Fetching {} was cancelled", key),
            result = api.get_opt(&key.name) => {
                result.with_context(|| format!("Failed to fetch {}", key))
            }
        }
    }

    async fn list(
        &self,
        ctx: &CancellationToken,
        namespace: &str,
        api_version: &str,
        kind: &str,
    ) -> Result<Vec<DynamicObject>> {
        let api = self.api(namespace, api_version, kind);
        let params = ListParams::default();

        let list = tokio::select! {
            _ = ctx.cancelled() => anyhow::bail!("Listing {} was cancelled", kind),
            result = api.list(&params) => {
                result.with_context(|| format!("Failed to list {} in '{}'", kind, namespace))?
            }
        };

        tracing::debug!("Listed {} {} object(s) in '{}'", list.items.len(), kind, namespace);

        // List items come back without type metadata
        Ok(list
            .items
            .into_iter()
            .map(|mut item| {
                if item.types.is_none() {
                    item.types = Some(TypeMeta {
                        api_version: api_version.to_string(),
                        kind: kind.to_string(),
                    });
                }
                item
            })
            .collect())
    }
}
